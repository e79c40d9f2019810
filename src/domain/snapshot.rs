//! Point-in-time copies of the ranking.
//!
//! A [`RankSnapshot`] is the engine's working representation: an ordered
//! list of `(player, rank)` pairs, ascending by rank with ties broken by
//! player id. It is what the ledger stores before each match and what the
//! ranking engine consumes and produces.

use serde::{Deserialize, Serialize};

use super::PlayerId;
use super::roster::RankChanges;

/// One `(player, rank)` pair inside a [`RankSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Player the rank belongs to.
    pub player_id: PlayerId,
    /// Rank held at snapshot time.
    pub rank: u32,
}

/// Ordered copy of the ranking taken at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankSnapshot(Vec<RankEntry>);

impl RankSnapshot {
    /// Builds a snapshot from arbitrary entries, sorting them by
    /// `(rank, player_id)`.
    #[must_use]
    pub fn from_entries(mut entries: Vec<RankEntry>) -> Self {
        entries.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.player_id.cmp(&b.player_id)));
        Self(entries)
    }

    /// Builds a dense snapshot from an ordered list of players: the first id
    /// gets rank 1, the next rank 2, and so on.
    #[must_use]
    pub fn from_order<'a>(order: impl IntoIterator<Item = &'a PlayerId>) -> Self {
        Self(
            order
                .into_iter()
                .enumerate()
                .map(|(index, player_id)| RankEntry {
                    player_id: player_id.clone(),
                    rank: rank_for_index(index),
                })
                .collect(),
        )
    }

    /// Entries in ascending rank order.
    #[must_use]
    pub fn entries(&self) -> &[RankEntry] {
        &self.0
    }

    /// Number of players captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no players were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rank recorded for `player_id`, if captured.
    #[must_use]
    pub fn rank_of(&self, player_id: &PlayerId) -> Option<u32> {
        self.0
            .iter()
            .find(|entry| &entry.player_id == player_id)
            .map(|entry| entry.rank)
    }

    /// Index of `player_id` in the ordered entries.
    #[must_use]
    pub fn position_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.0.iter().position(|entry| &entry.player_id == player_id)
    }

    /// Entries of `self` whose rank differs from (or is absent in) `before`.
    #[must_use]
    pub fn changes_since(&self, before: &Self) -> RankChanges {
        self.0
            .iter()
            .filter(|entry| before.rank_of(&entry.player_id) != Some(entry.rank))
            .map(|entry| (entry.player_id.clone(), entry.rank))
            .collect()
    }
}

/// Converts a zero-based position into a one-based rank.
pub(crate) fn rank_for_index(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}
