//! Player DTOs for roster management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::{PaginationMeta, RankMap};
use crate::domain::Player;

/// Request body for `POST /players`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlayerRequest {
    /// Externally chosen id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Opaque contact handle.
    #[serde(default)]
    pub contact: Option<String>,
}

/// Request body for `PATCH /players/{id}`. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePlayerRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New contact handle.
    #[serde(default)]
    pub contact: Option<String>,
}

/// A player as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerDto {
    /// Player id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current rank, `1` is the top.
    pub rank: u32,
    /// Contact handle.
    pub contact: Option<String>,
    /// Most recent match participation.
    pub last_active_at: Option<DateTime<Utc>>,
}

impl From<Player> for PlayerDto {
    fn from(player: Player) -> Self {
        Self {
            id: player.id.to_string(),
            name: player.name,
            rank: player.rank,
            contact: player.contact,
            last_active_at: player.last_active_at,
        }
    }
}

/// Response body for `GET /players`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlayerListResponse {
    /// Players in rank order.
    pub data: Vec<PlayerDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `DELETE /players/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemovePlayerResponse {
    /// The departed player as last stored.
    pub player: PlayerDto,
    /// Ranks shifted up to close the gap.
    pub updated_ranks: RankMap,
}
