//! Roster administration: invariant check and renumbering.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{RenumberResponse, ValidationResponse, rank_map};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, LadderError};

/// `GET /roster/validate` — Check that ranks form `1..=N`.
///
/// A broken roster is reported in the body, not as an HTTP error.
#[utoipa::path(
    get,
    path = "/api/v1/roster/validate",
    tag = "Roster",
    summary = "Validate the roster",
    description = "Reports every gap, duplicate and out-of-range rank. Nothing is repaired.",
    responses(
        (status = 200, description = "Validation report", body = ValidationResponse),
    )
)]
pub async fn validate_roster(State(state): State<AppState>) -> Json<ValidationResponse> {
    let report = state.ladder_service.validation_report().await;
    Json(ValidationResponse {
        valid: report.is_valid(),
        player_count: report.player_count,
        violations: report.violations.iter().map(ToString::to_string).collect(),
    })
}

/// `POST /roster/renumber` — Reassign dense ranks in current order.
///
/// # Errors
///
/// Returns [`LadderError::PersistenceError`] if the new ranks cannot be
/// stored.
#[utoipa::path(
    post,
    path = "/api/v1/roster/renumber",
    tag = "Roster",
    summary = "Renumber the roster",
    description = "Sorts players by (rank, id) and assigns 1..=N. Use after a partial restore left the roster inconsistent.",
    responses(
        (status = 200, description = "Ranks that moved", body = RenumberResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn renumber_roster(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, LadderError> {
    let changes = state.ladder_service.renumber().await?;
    Ok(Json(RenumberResponse {
        updated_ranks: rank_map(&changes),
    }))
}

/// Roster administration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roster/validate", get(validate_roster))
        .route("/roster/renumber", post(renumber_roster))
}
