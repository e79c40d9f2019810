//! Authoritative rank state of the ladder.
//!
//! A [`Roster`] holds every [`Player`] and enforces nothing on its own:
//! the dense-rank invariant (`{1, 2, ..., N}` for `N` players) is checked
//! by [`Roster::validate`] and only ever repaired by the explicit
//! [`Roster::renumber`] pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::{RankEntry, RankSnapshot, rank_for_index};
use super::{Player, PlayerId};
use crate::error::LadderError;

/// New rank per player; only players whose rank actually moved.
pub type RankChanges = BTreeMap<PlayerId, u32>;

/// A single way in which a roster breaks the dense-rank invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankViolation {
    /// A rank of zero or beyond the roster size.
    #[error("player {player_id} holds rank {rank}, outside 1..={size}")]
    OutOfRange {
        /// Offending player.
        player_id: PlayerId,
        /// Rank it holds.
        rank: u32,
        /// Roster size at validation time.
        size: u32,
    },
    /// Several players share one rank.
    #[error("rank {rank} is shared by {}", join_ids(.players))]
    Duplicate {
        /// Shared rank.
        rank: u32,
        /// Players holding it.
        players: Vec<PlayerId>,
    },
    /// Nobody holds this rank.
    #[error("rank {rank} is unoccupied")]
    Missing {
        /// Vacant rank.
        rank: u32,
    },
}

/// Report returned when a roster is not a dense `1..=N` sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("roster ranks are not a dense sequence ({} violation(s))", .violations.len())]
pub struct InvariantViolation {
    /// Every problem found, gaps and duplicates alike.
    pub violations: Vec<RankViolation>,
}

fn join_ids(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(PlayerId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collection of ranked players keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps players as loaded from storage. Ranks are taken as-is.
    #[must_use]
    pub fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Number of players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if the roster has no players.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All players in storage order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player by identity.
    #[must_use]
    pub fn find_by_id(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn find_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    /// Fresh view of the players ordered by ascending rank, ties broken by id.
    #[must_use]
    pub fn sorted_by_rank(&self) -> Vec<Player> {
        let mut sorted = self.players.clone();
        sorted.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
        sorted
    }

    /// Ordered `(player, rank)` copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RankSnapshot {
        RankSnapshot::from_entries(
            self.players
                .iter()
                .map(|p| RankEntry {
                    player_id: p.id.clone(),
                    rank: p.rank,
                })
                .collect(),
        )
    }

    /// Checks that ranks form exactly `{1, ..., N}`.
    ///
    /// Pure: calling it twice on an untouched roster yields the same result.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] listing every out-of-range rank,
    /// duplicate and gap.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let size = u32::try_from(self.players.len()).unwrap_or(u32::MAX);
        let mut holders: BTreeMap<u32, Vec<PlayerId>> = BTreeMap::new();
        let mut violations = Vec::new();

        for player in self.sorted_by_rank() {
            if player.rank == 0 || player.rank > size {
                violations.push(RankViolation::OutOfRange {
                    player_id: player.id.clone(),
                    rank: player.rank,
                    size,
                });
            }
            holders.entry(player.rank).or_default().push(player.id);
        }

        for (rank, players) in &holders {
            if players.len() > 1 {
                violations.push(RankViolation::Duplicate {
                    rank: *rank,
                    players: players.clone(),
                });
            }
        }

        for rank in 1..=size {
            if !holders.contains_key(&rank) {
                violations.push(RankViolation::Missing { rank });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(InvariantViolation { violations })
        }
    }

    /// Adds a newcomer at the bottom of the ladder.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::InvalidRequest`] if the name is blank or the
    /// id is already taken.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: &str,
        contact: Option<String>,
    ) -> Result<Player, LadderError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LadderError::InvalidRequest(
                "player name must not be empty".to_string(),
            ));
        }
        if id.as_str().is_empty() {
            return Err(LadderError::InvalidRequest(
                "player id must not be empty".to_string(),
            ));
        }
        if self.find_by_id(&id).is_some() {
            return Err(LadderError::InvalidRequest(format!(
                "player {id} already exists"
            )));
        }

        let bottom = self.players.iter().map(|p| p.rank).max().unwrap_or(0);
        let player = Player {
            id,
            name: name.to_string(),
            rank: bottom.saturating_add(1),
            contact,
            last_active_at: None,
        };
        self.players.push(player.clone());
        Ok(player)
    }

    /// Removes a player and moves everyone below them up one slot.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PlayerNotFound`] for an unknown id.
    pub fn remove(&mut self, id: &PlayerId) -> Result<(Player, RankChanges), LadderError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| LadderError::PlayerNotFound(id.clone()))?;
        let removed = self.players.remove(index);

        let mut changes = RankChanges::new();
        for player in &mut self.players {
            if player.rank > removed.rank {
                player.rank -= 1;
                changes.insert(player.id.clone(), player.rank);
            }
        }
        Ok((removed, changes))
    }

    /// Edits the pass-through profile fields of a player.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PlayerNotFound`] for an unknown id and
    /// [`LadderError::InvalidRequest`] for a blank name.
    pub fn update_profile(
        &mut self,
        id: &PlayerId,
        name: Option<&str>,
        contact: Option<String>,
    ) -> Result<Player, LadderError> {
        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(LadderError::InvalidRequest(
                "player name must not be empty".to_string(),
            ));
        }
        let player = self
            .find_mut(id)
            .ok_or_else(|| LadderError::PlayerNotFound(id.clone()))?;
        if let Some(name) = name {
            player.name = name.to_string();
        }
        if contact.is_some() {
            player.contact = contact;
        }
        Ok(player.clone())
    }

    /// Writes new ranks. Returns ids named in `changes` that are not in
    /// the roster; those are skipped.
    pub fn apply_ranks(&mut self, changes: &RankChanges) -> Vec<PlayerId> {
        let mut missing = Vec::new();
        for (id, rank) in changes {
            match self.find_mut(id) {
                Some(player) => player.rank = *rank,
                None => missing.push(id.clone()),
            }
        }
        missing
    }

    /// Records activity for a player. Unknown ids are ignored.
    pub fn touch(&mut self, id: &PlayerId, at: DateTime<Utc>) {
        if let Some(player) = self.find_mut(id) {
            player.last_active_at = Some(at);
        }
    }

    /// Explicit reconciliation pass: reassigns `1..=N` in current
    /// `(rank, id)` order and returns what moved.
    pub fn renumber(&mut self) -> RankChanges {
        let order: Vec<PlayerId> = self.sorted_by_rank().into_iter().map(|p| p.id).collect();
        let target = RankSnapshot::from_order(&order);
        let changes = target.changes_since(&self.snapshot());
        self.apply_ranks(&changes);
        changes
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn roster(ranks: &[(&str, u32)]) -> Roster {
        Roster::from_players(
            ranks
                .iter()
                .map(|(id, rank)| Player::new(*id, id.to_uppercase(), *rank))
                .collect(),
        )
    }

    #[test]
    fn dense_roster_validates() {
        let r = roster(&[("b", 2), ("a", 1), ("c", 3)]);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn empty_roster_validates() {
        assert!(Roster::new().validate().is_ok());
    }

    #[test]
    fn gap_and_duplicate_are_reported() {
        let r = roster(&[("a", 1), ("b", 1), ("c", 3)]);
        let Err(report) = r.validate() else {
            panic!("expected a violation");
        };
        assert!(report.violations.contains(&RankViolation::Missing { rank: 2 }));
        assert!(report.violations.contains(&RankViolation::Duplicate {
            rank: 1,
            players: vec![PlayerId::from("a"), PlayerId::from("b")],
        }));
    }

    #[test]
    fn out_of_range_is_reported() {
        let r = roster(&[("a", 0), ("b", 5)]);
        let Err(report) = r.validate() else {
            panic!("expected a violation");
        };
        let out_of_range = report
            .violations
            .iter()
            .filter(|v| matches!(v, RankViolation::OutOfRange { .. }))
            .count();
        assert_eq!(out_of_range, 2);
    }

    #[test]
    fn validate_is_idempotent() {
        let r = roster(&[("a", 1), ("b", 3)]);
        assert_eq!(r.validate(), r.validate());
        let clean = roster(&[("a", 1)]);
        assert_eq!(clean.validate(), clean.validate());
    }

    #[test]
    fn sorted_by_rank_does_not_mutate() {
        let r = roster(&[("c", 3), ("a", 1), ("b", 2)]);
        let sorted = r.sorted_by_rank();
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(r.players().first().map(|p| p.id.as_str()), Some("c"));
    }

    #[test]
    fn join_appends_at_bottom() {
        let mut r = roster(&[("a", 1), ("b", 2)]);
        let Ok(player) = r.join(PlayerId::from("c"), "  Carol ", None) else {
            panic!("join failed");
        };
        assert_eq!(player.rank, 3);
        assert_eq!(player.name, "Carol");
        assert!(r.validate().is_ok());
    }

    #[test]
    fn join_rejects_blank_name_and_duplicate_id() {
        let mut r = roster(&[("a", 1)]);
        assert!(r.join(PlayerId::from("b"), "   ", None).is_err());
        assert!(r.join(PlayerId::from("a"), "Again", None).is_err());
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn remove_closes_the_gap() {
        let mut r = roster(&[("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
        let Ok((removed, changes)) = r.remove(&PlayerId::from("b")) else {
            panic!("remove failed");
        };
        assert_eq!(removed.rank, 2);
        assert_eq!(changes.get(&PlayerId::from("c")), Some(&2));
        assert_eq!(changes.get(&PlayerId::from("d")), Some(&3));
        assert!(!changes.contains_key(&PlayerId::from("a")));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn remove_unknown_player_fails() {
        let mut r = roster(&[("a", 1)]);
        assert!(matches!(
            r.remove(&PlayerId::from("ghost")),
            Err(LadderError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn update_profile_keeps_rank() {
        let mut r = roster(&[("a", 1)]);
        let Ok(player) = r.update_profile(&PlayerId::from("a"), Some("Ann"), Some("+100".into()))
        else {
            panic!("update failed");
        };
        assert_eq!(player.name, "Ann");
        assert_eq!(player.contact.as_deref(), Some("+100"));
        assert_eq!(player.rank, 1);
    }

    #[test]
    fn apply_ranks_reports_missing_ids() {
        let mut r = roster(&[("a", 1), ("b", 2)]);
        let mut changes = RankChanges::new();
        changes.insert(PlayerId::from("a"), 2);
        changes.insert(PlayerId::from("b"), 1);
        changes.insert(PlayerId::from("gone"), 3);
        let missing = r.apply_ranks(&changes);
        assert_eq!(missing, vec![PlayerId::from("gone")]);
        assert_eq!(r.find_by_id(&PlayerId::from("a")).map(|p| p.rank), Some(2));
    }

    #[test]
    fn renumber_heals_drift() {
        let mut r = roster(&[("a", 2), ("b", 2), ("c", 7)]);
        let changes = r.renumber();
        assert!(r.validate().is_ok());
        assert_eq!(changes.get(&PlayerId::from("a")), Some(&1));
        assert!(!changes.contains_key(&PlayerId::from("b")));
        assert_eq!(changes.get(&PlayerId::from("c")), Some(&3));
    }

    #[test]
    fn renumber_on_dense_roster_is_noop() {
        let mut r = roster(&[("a", 1), ("b", 2)]);
        assert!(r.renumber().is_empty());
    }
}
