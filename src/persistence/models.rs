//! Database rows for players and matches.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{MatchId, MatchRecord, Player, PlayerId, RankSnapshot};
use crate::error::LadderError;

/// A row of the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Opaque player id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ladder rank (`INTEGER`).
    pub rank: i32,
    /// External contact handle.
    pub contact: Option<String>,
    /// Most recent match participation.
    pub last_active_at: Option<DateTime<Utc>>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = LadderError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        let rank = u32::try_from(row.rank).map_err(|_| {
            LadderError::PersistenceError(format!("player {} has negative rank {}", row.id, row.rank))
        })?;
        Ok(Self {
            id: PlayerId::new(row.id),
            name: row.name,
            rank,
            contact: row.contact,
            last_active_at: row.last_active_at,
        })
    }
}

/// A row of the `matches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
    /// Ledger id.
    pub id: Uuid,
    /// Winner id.
    pub winner_id: String,
    /// Loser id.
    pub loser_id: String,
    /// Pre-match ranking as JSONB, absent for legacy rows.
    pub roster_snapshot: Option<Json<RankSnapshot>>,
    /// Submission timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Last reversal timestamp.
    pub reversed_at: Option<DateTime<Utc>>,
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        Self {
            id: MatchId::from_uuid(row.id),
            winner_id: PlayerId::new(row.winner_id),
            loser_id: PlayerId::new(row.loser_id),
            roster_snapshot: row.roster_snapshot.map(|Json(snapshot)| snapshot),
            occurred_at: row.occurred_at,
            reversed_at: row.reversed_at,
        }
    }
}

/// Converts a domain rank to the `INTEGER` column type.
///
/// # Errors
///
/// Returns [`LadderError::PersistenceError`] if the rank exceeds `i32::MAX`.
pub fn rank_column(player_id: &PlayerId, rank: u32) -> Result<i32, LadderError> {
    i32::try_from(rank).map_err(|_| {
        LadderError::PersistenceError(format!("rank {rank} of player {player_id} overflows"))
    })
}
