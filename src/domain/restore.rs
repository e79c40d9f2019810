//! Planning rank restorations onto a live roster.
//!
//! Both match deletion and match reversal push a historical ranking back
//! onto a roster that may have changed since. Planning is pure; the plan
//! lists what to write and what could not be reconciled. Nothing is
//! guessed: players missing from the roster are reported, and players that
//! joined after the snapshot keep their ranks even if density breaks.

use serde::{Deserialize, Serialize};

use super::roster::{InvariantViolation, RankChanges};
use super::snapshot::RankSnapshot;
use super::{PlayerId, Roster};

/// Non-fatal condition found while restoring a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartialRestoreWarning {
    /// The record carried no snapshot, so no ranks were restored.
    #[error("match has no roster snapshot; ranks were left untouched")]
    SnapshotMissing,
    /// Snapshot players that are no longer on the roster.
    #[error("{} snapshot player(s) no longer on the roster", .players.len())]
    PlayersMissing {
        /// Absent players.
        players: Vec<PlayerId>,
    },
    /// The roster is not dense after the restore.
    #[error("restored ranks are not dense: {violation}")]
    NotDense {
        /// Validation report of the restored roster.
        violation: InvariantViolation,
    },
}

/// Result of planning a restoration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredRoster {
    /// Rank writes to apply to the live roster.
    pub updated_ranks: RankChanges,
    /// Conditions an operator should be told about.
    pub warnings: Vec<PartialRestoreWarning>,
}

impl RestoredRoster {
    /// Plan for a record that has no snapshot.
    #[must_use]
    pub fn without_snapshot() -> Self {
        Self {
            updated_ranks: RankChanges::new(),
            warnings: vec![PartialRestoreWarning::SnapshotMissing],
        }
    }

    /// Returns `true` when the restore went through cleanly.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Plans writing every rank in `target` onto `roster`.
#[must_use]
pub fn plan_restore(roster: &Roster, target: &RankSnapshot) -> RestoredRoster {
    let mut updated_ranks = RankChanges::new();
    let mut missing = Vec::new();

    for entry in target.entries() {
        match roster.find_by_id(&entry.player_id) {
            Some(player) if player.rank != entry.rank => {
                updated_ranks.insert(entry.player_id.clone(), entry.rank);
            }
            Some(_) => {}
            None => missing.push(entry.player_id.clone()),
        }
    }

    let mut warnings = Vec::new();
    if !missing.is_empty() {
        warnings.push(PartialRestoreWarning::PlayersMissing { players: missing });
    }

    let mut preview = roster.clone();
    preview.apply_ranks(&updated_ranks);
    if let Err(violation) = preview.validate() {
        warnings.push(PartialRestoreWarning::NotDense { violation });
    }

    RestoredRoster {
        updated_ranks,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Player;
    use crate::domain::snapshot::RankEntry;

    fn snapshot(ranks: &[(&str, u32)]) -> RankSnapshot {
        RankSnapshot::from_entries(
            ranks
                .iter()
                .map(|(id, rank)| RankEntry {
                    player_id: PlayerId::from(*id),
                    rank: *rank,
                })
                .collect(),
        )
    }

    #[test]
    fn clean_restore_has_no_warnings() {
        let live = Roster::from_players(vec![
            Player::new("a", "A", 2),
            Player::new("b", "B", 1),
        ]);
        let plan = plan_restore(&live, &snapshot(&[("a", 1), ("b", 2)]));
        assert!(plan.is_complete());
        assert_eq!(plan.updated_ranks.len(), 2);
    }

    #[test]
    fn missing_players_are_reported_not_guessed() {
        let live = Roster::from_players(vec![Player::new("a", "A", 1)]);
        let plan = plan_restore(&live, &snapshot(&[("a", 1), ("gone", 2)]));
        assert!(plan.updated_ranks.is_empty());
        assert_eq!(
            plan.warnings,
            vec![PartialRestoreWarning::PlayersMissing {
                players: vec![PlayerId::from("gone")]
            }]
        );
    }

    #[test]
    fn departed_player_leaves_a_gap() {
        // `b` left after the snapshot and `c` moved up to 2.
        let live = Roster::from_players(vec![
            Player::new("a", "A", 1),
            Player::new("c", "C", 2),
        ]);
        let plan = plan_restore(&live, &snapshot(&[("a", 1), ("b", 2), ("c", 3)]));
        assert_eq!(plan.updated_ranks.get(&PlayerId::from("c")), Some(&3));
        assert_eq!(plan.warnings.len(), 2);
        assert!(
            plan.warnings
                .iter()
                .any(|w| matches!(w, PartialRestoreWarning::NotDense { .. }))
        );
    }

    #[test]
    fn newcomer_keeps_rank() {
        let live = Roster::from_players(vec![
            Player::new("b", "B", 1),
            Player::new("a", "A", 2),
            Player::new("new", "N", 3),
        ]);
        let plan = plan_restore(&live, &snapshot(&[("a", 1), ("b", 2)]));
        assert!(plan.is_complete());
        assert!(!plan.updated_ranks.contains_key(&PlayerId::from("new")));
    }

    #[test]
    fn without_snapshot_warns() {
        let plan = RestoredRoster::without_snapshot();
        assert!(!plan.is_complete());
        assert!(plan.updated_ranks.is_empty());
    }
}
