//! Domain events reflecting ladder mutations.
//!
//! Every state change emits a [`LadderEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers, who
//! filter them by the players they follow.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::roster::RankChanges;
use super::{MatchId, PlayerId};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LadderEvent {
    /// A player joined at the bottom of the ladder.
    PlayerJoined {
        /// New player.
        player_id: PlayerId,
        /// Display name.
        name: String,
        /// Starting rank.
        rank: u32,
        /// Join timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A player left; everyone below moved up.
    PlayerRemoved {
        /// Departed player.
        player_id: PlayerId,
        /// Ranks shifted to close the gap.
        updated_ranks: RankChanges,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A player's name or contact changed.
    PlayerUpdated {
        /// Edited player.
        player_id: PlayerId,
        /// Edit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A match result was applied.
    MatchResolved {
        /// Ledger id.
        match_id: MatchId,
        /// Winner.
        winner_id: PlayerId,
        /// Loser.
        loser_id: PlayerId,
        /// Whether ranks moved.
        changed: bool,
        /// Ranks that moved.
        updated_ranks: RankChanges,
        /// Resolution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A match outcome was reversed by an administrator.
    MatchReversed {
        /// Ledger id.
        match_id: MatchId,
        /// Winner after reversal.
        winner_id: PlayerId,
        /// Loser after reversal.
        loser_id: PlayerId,
        /// Ranks written on the live roster.
        updated_ranks: RankChanges,
        /// Partial-restore warnings, human readable.
        warnings: Vec<String>,
        /// Reversal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A match was deleted and its snapshot restored.
    MatchDeleted {
        /// Ledger id.
        match_id: MatchId,
        /// Winner of the deleted match.
        winner_id: PlayerId,
        /// Loser of the deleted match.
        loser_id: PlayerId,
        /// Ranks written on the live roster.
        updated_ranks: RankChanges,
        /// Partial-restore warnings, human readable.
        warnings: Vec<String>,
        /// Deletion timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The administrator renumbered the roster.
    RosterRenumbered {
        /// Ranks that moved.
        updated_ranks: RankChanges,
        /// Renumbering timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LadderEvent {
    /// Returns `true` if the event concerns `player_id`, either as a named
    /// participant or through a rank change.
    #[must_use]
    pub fn concerns(&self, player_id: &PlayerId) -> bool {
        match self {
            Self::PlayerJoined { player_id: p, .. } | Self::PlayerUpdated { player_id: p, .. } => {
                p == player_id
            }
            Self::PlayerRemoved {
                player_id: p,
                updated_ranks,
                ..
            } => p == player_id || updated_ranks.contains_key(player_id),
            Self::MatchResolved {
                winner_id,
                loser_id,
                updated_ranks,
                ..
            }
            | Self::MatchReversed {
                winner_id,
                loser_id,
                updated_ranks,
                ..
            }
            | Self::MatchDeleted {
                winner_id,
                loser_id,
                updated_ranks,
                ..
            } => {
                winner_id == player_id
                    || loser_id == player_id
                    || updated_ranks.contains_key(player_id)
            }
            Self::RosterRenumbered { updated_ranks, .. } => updated_ranks.contains_key(player_id),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PlayerJoined { .. } => "player_joined",
            Self::PlayerRemoved { .. } => "player_removed",
            Self::PlayerUpdated { .. } => "player_updated",
            Self::MatchResolved { .. } => "match_resolved",
            Self::MatchReversed { .. } => "match_reversed",
            Self::MatchDeleted { .. } => "match_deleted",
            Self::RosterRenumbered { .. } => "roster_renumbered",
        }
    }
}
