//! Match handlers: submit, list, get, reverse, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    MatchDto, MatchListParams, MatchListResponse, MatchResultResponse, RestoreResponse,
    SubmitMatchRequest,
};
use crate::app_state::AppState;
use crate::domain::{MatchId, PlayerId};
use crate::error::{ErrorResponse, LadderError};

/// `POST /matches` — Submit a result and apply it to the ladder.
///
/// # Errors
///
/// Returns [`LadderError::PlayerNotFound`] if either player is absent and
/// [`LadderError::InvalidRequest`] for a self-match.
#[utoipa::path(
    post,
    path = "/api/v1/matches",
    tag = "Matches",
    summary = "Submit a match result",
    description = "Snapshots the roster, resolves the result with leapfrog promotion, applies the new ranks and records the match.",
    request_body = SubmitMatchRequest,
    responses(
        (status = 201, description = "Match recorded", body = MatchResultResponse),
        (status = 400, description = "Winner and loser are the same player", body = ErrorResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn submit_match(
    State(state): State<AppState>,
    Json(req): Json<SubmitMatchRequest>,
) -> Result<impl IntoResponse, LadderError> {
    let submitted = state
        .ladder_service
        .submit_match(&PlayerId::new(req.winner_id), &PlayerId::new(req.loser_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MatchResultResponse::from(submitted)),
    ))
}

/// `GET /matches` — Ledger, most recent first.
///
/// # Errors
///
/// Never fails today; the signature matches the other handlers.
#[utoipa::path(
    get,
    path = "/api/v1/matches",
    tag = "Matches",
    summary = "List matches",
    description = "Returns ledger entries newest first, optionally only those a player took part in.",
    params(MatchListParams),
    responses(
        (status = 200, description = "Paginated ledger", body = MatchListResponse),
    )
)]
pub async fn list_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchListParams>,
) -> Result<impl IntoResponse, LadderError> {
    let player_id = params.player_id.clone().map(PlayerId::new);
    let records = state
        .ladder_service
        .list_matches(player_id.as_ref())
        .await;
    let (page, pagination) = params.pagination().paginate(records);
    Ok(Json(MatchListResponse {
        data: page.iter().map(MatchDto::from).collect(),
        pagination,
    }))
}

/// `GET /matches/{id}` — One ledger entry.
///
/// # Errors
///
/// Returns [`LadderError::MatchNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    summary = "Get a match",
    params(
        ("id" = uuid::Uuid, Path, description = "Match UUID"),
    ),
    responses(
        (status = 200, description = "Ledger entry", body = MatchDto),
        (status = 404, description = "Match not found", body = ErrorResponse),
    )
)]
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LadderError> {
    let record = state
        .ladder_service
        .get_match(MatchId::from_uuid(id))
        .await?;
    Ok(Json(MatchDto::from(&record)))
}

/// `POST /matches/{id}/reverse` — Swap winner and loser and replay.
///
/// # Errors
///
/// Returns [`LadderError::MatchNotFound`] or
/// [`LadderError::NoSnapshotAvailable`].
#[utoipa::path(
    post,
    path = "/api/v1/matches/{id}/reverse",
    tag = "Matches",
    summary = "Reverse a match outcome",
    description = "Replays the match from its pre-match snapshot with winner and loser swapped and pushes the result onto the live roster.",
    params(
        ("id" = uuid::Uuid, Path, description = "Match UUID"),
    ),
    responses(
        (status = 200, description = "Match reversed", body = RestoreResponse),
        (status = 404, description = "Match not found", body = ErrorResponse),
        (status = 409, description = "Match has no snapshot", body = ErrorResponse),
    )
)]
pub async fn reverse_match(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LadderError> {
    let reversed = state
        .ladder_service
        .reverse_match(MatchId::from_uuid(id))
        .await?;
    Ok(Json(RestoreResponse::from(reversed)))
}

/// `DELETE /matches/{id}` — Remove a match and restore its snapshot.
///
/// # Errors
///
/// Returns [`LadderError::MatchNotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    summary = "Delete a match",
    description = "Removes the ledger entry and restores the pre-match ranks. Problems are reported as warnings, never repaired.",
    params(
        ("id" = uuid::Uuid, Path, description = "Match UUID"),
    ),
    responses(
        (status = 200, description = "Match deleted", body = RestoreResponse),
        (status = 404, description = "Match not found", body = ErrorResponse),
    )
)]
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LadderError> {
    let deleted = state
        .ladder_service
        .delete_match(MatchId::from_uuid(id))
        .await?;
    Ok(Json(RestoreResponse::from(deleted)))
}

/// Match ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matches", post(submit_match).get(list_matches))
        .route("/matches/{id}", get(get_match).delete(delete_match))
        .route("/matches/{id}/reverse", post(reverse_match))
}
