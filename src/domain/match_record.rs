//! Ledger entry for one resolved match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::RankSnapshot;
use super::{MatchId, PlayerId};

/// Immutable record of a resolved challenge.
///
/// `winner_id` and `loser_id` are plain references: the players may be
/// removed later and the record keeps pointing at them. Only reversal
/// rewrites a record (swapping the outcome and stamping `reversed_at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Ledger identity.
    pub id: MatchId,
    /// Player credited with the win.
    pub winner_id: PlayerId,
    /// Player credited with the loss.
    pub loser_id: PlayerId,
    /// Ranking immediately before the match was applied. Without it the
    /// record cannot be reversed and deletion restores nothing.
    pub roster_snapshot: Option<RankSnapshot>,
    /// When the result was submitted.
    pub occurred_at: DateTime<Utc>,
    /// When an administrator last reversed the outcome.
    pub reversed_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Builds a fresh, unreversed record with a new id.
    #[must_use]
    pub fn new(
        winner_id: PlayerId,
        loser_id: PlayerId,
        roster_snapshot: Option<RankSnapshot>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MatchId::new(),
            winner_id,
            loser_id,
            roster_snapshot,
            occurred_at,
            reversed_at: None,
        }
    }

    /// Returns `true` if the record names `player_id` on either side.
    #[must_use]
    pub fn involves(&self, player_id: &PlayerId) -> bool {
        &self.winner_id == player_id || &self.loser_id == player_id
    }

    /// Returns `true` if a pre-match snapshot is stored.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.roster_snapshot.is_some()
    }
}
