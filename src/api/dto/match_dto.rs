//! Match DTOs: submission, ledger views and restorations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, RankMap, rank_map};
use crate::domain::ladder_state::{DeletedMatch, ReversedMatch, SubmittedMatch};
use crate::domain::{MatchRecord, PartialRestoreWarning, RankSnapshot, RestoredRoster};

/// Request body for `POST /matches`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitMatchRequest {
    /// Player who won.
    pub winner_id: String,
    /// Player who lost.
    pub loser_id: String,
}

/// Query parameters for `GET /matches`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Only matches this player took part in.
    #[serde(default)]
    pub player_id: Option<String>,
}

fn default_page() -> u32 {
    PaginationParams::default().page
}

fn default_per_page() -> u32 {
    PaginationParams::default().per_page
}

impl MatchListParams {
    /// Pagination part of the query.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// One `(player, rank)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankEntryDto {
    /// Player id.
    pub player_id: String,
    /// Rank held.
    pub rank: u32,
}

fn entries(snapshot: &RankSnapshot) -> Vec<RankEntryDto> {
    snapshot
        .entries()
        .iter()
        .map(|e| RankEntryDto {
            player_id: e.player_id.to_string(),
            rank: e.rank,
        })
        .collect()
}

/// A ledger entry as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchDto {
    /// Ledger id.
    pub match_id: uuid::Uuid,
    /// Winner.
    pub winner_id: String,
    /// Loser.
    pub loser_id: String,
    /// Submission timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Set once the outcome has been reversed.
    pub reversed_at: Option<DateTime<Utc>>,
    /// Ranking captured before the match, absent for legacy entries.
    pub roster_snapshot: Option<Vec<RankEntryDto>>,
}

impl From<&MatchRecord> for MatchDto {
    fn from(record: &MatchRecord) -> Self {
        Self {
            match_id: *record.id.as_uuid(),
            winner_id: record.winner_id.to_string(),
            loser_id: record.loser_id.to_string(),
            occurred_at: record.occurred_at,
            reversed_at: record.reversed_at,
            roster_snapshot: record.roster_snapshot.as_ref().map(entries),
        }
    }
}

/// Response body for `GET /matches`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchListResponse {
    /// Ledger entries, most recent first.
    pub data: Vec<MatchDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `POST /matches` (201 Created).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchResultResponse {
    /// Recorded ledger entry.
    #[serde(rename = "match")]
    pub record: MatchDto,
    /// Whether any rank moved.
    pub changed: bool,
    /// Ranks that moved.
    pub updated_ranks: RankMap,
    /// Full ranking after the match.
    pub standings: Vec<RankEntryDto>,
}

impl From<SubmittedMatch> for MatchResultResponse {
    fn from(submitted: SubmittedMatch) -> Self {
        Self {
            record: MatchDto::from(&submitted.record),
            changed: submitted.resolution.changed,
            updated_ranks: rank_map(&submitted.resolution.updated_ranks),
            standings: entries(&submitted.resolution.standings),
        }
    }
}

/// A partial-restore condition as reported to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestoreWarningDto {
    /// `snapshot_missing`, `players_missing` or `not_dense`.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// Players involved, when the warning names any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<String>,
}

impl From<&PartialRestoreWarning> for RestoreWarningDto {
    fn from(warning: &PartialRestoreWarning) -> Self {
        let (kind, players) = match warning {
            PartialRestoreWarning::SnapshotMissing => ("snapshot_missing", Vec::new()),
            PartialRestoreWarning::PlayersMissing { players } => (
                "players_missing",
                players.iter().map(ToString::to_string).collect(),
            ),
            PartialRestoreWarning::NotDense { .. } => ("not_dense", Vec::new()),
        };
        Self {
            kind: kind.to_string(),
            message: warning.to_string(),
            players,
        }
    }
}

/// Response body for reversal and deletion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestoreResponse {
    /// The rewritten (reversal) or removed (deletion) ledger entry.
    #[serde(rename = "match")]
    pub record: MatchDto,
    /// Ranks written on the live roster.
    pub updated_ranks: RankMap,
    /// `true` when no warning was raised.
    pub complete: bool,
    /// Conditions the operator should review.
    pub warnings: Vec<RestoreWarningDto>,
}

impl RestoreResponse {
    fn new(record: &MatchRecord, restore: &RestoredRoster) -> Self {
        Self {
            record: MatchDto::from(record),
            updated_ranks: rank_map(&restore.updated_ranks),
            complete: restore.is_complete(),
            warnings: restore.warnings.iter().map(RestoreWarningDto::from).collect(),
        }
    }
}

impl From<ReversedMatch> for RestoreResponse {
    fn from(reversed: ReversedMatch) -> Self {
        Self::new(&reversed.record, &reversed.restore)
    }
}

impl From<DeletedMatch> for RestoreResponse {
    fn from(deleted: DeletedMatch) -> Self {
        Self::new(&deleted.record, &deleted.restore)
    }
}
