//! Roster administration DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::RankMap;

/// Response body for `GET /roster/validate`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationResponse {
    /// `true` when ranks form the dense sequence `1..=N`.
    pub valid: bool,
    /// Number of players checked.
    pub player_count: usize,
    /// One line per gap, duplicate or out-of-range rank.
    pub violations: Vec<String>,
}

/// Response body for `POST /roster/renumber`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenumberResponse {
    /// Ranks that moved; empty when the roster was already dense.
    pub updated_ranks: RankMap,
}
