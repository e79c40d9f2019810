//! Player handlers: join, list, get, edit, remove.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreatePlayerRequest, PaginationParams, PlayerDto, PlayerListResponse, RemovePlayerResponse,
    UpdatePlayerRequest, rank_map,
};
use crate::app_state::AppState;
use crate::domain::PlayerId;
use crate::error::{ErrorResponse, LadderError};

/// `POST /players` — Add a player at the bottom of the ladder.
///
/// # Errors
///
/// Returns [`LadderError::InvalidRequest`] for a blank name or a taken id.
#[utoipa::path(
    post,
    path = "/api/v1/players",
    tag = "Players",
    summary = "Add a player",
    description = "Adds a player at rank N+1. An id is generated when none is supplied.",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player added", body = PlayerDto),
        (status = 400, description = "Blank name or duplicate id", body = ErrorResponse),
    )
)]
pub async fn create_player(
    State(state): State<AppState>,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, LadderError> {
    let player = state
        .ladder_service
        .add_player(req.id.map(PlayerId::new), &req.name, req.contact)
        .await?;
    Ok((StatusCode::CREATED, Json(PlayerDto::from(player))))
}

/// `GET /players` — Paginated roster in rank order.
///
/// # Errors
///
/// Never fails today; the signature matches the other handlers.
#[utoipa::path(
    get,
    path = "/api/v1/players",
    tag = "Players",
    summary = "List players",
    description = "Returns the roster in ascending rank order, paginated.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated roster", body = PlayerListResponse),
    )
)]
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, LadderError> {
    let roster = state.ladder_service.roster().await;
    let (page, pagination) = params.paginate(roster);
    Ok(Json(PlayerListResponse {
        data: page.into_iter().map(PlayerDto::from).collect(),
        pagination,
    }))
}

/// `GET /players/{id}` — One player's standing.
///
/// # Errors
///
/// Returns [`LadderError::PlayerNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/players/{id}",
    tag = "Players",
    summary = "Get a player",
    params(
        ("id" = String, Path, description = "Player id"),
    ),
    responses(
        (status = 200, description = "Player details", body = PlayerDto),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LadderError> {
    let player = state.ladder_service.player(&PlayerId::new(id)).await?;
    Ok(Json(PlayerDto::from(player)))
}

/// `PATCH /players/{id}` — Edit name or contact. Ranks cannot be edited.
///
/// # Errors
///
/// Returns [`LadderError::PlayerNotFound`] or [`LadderError::InvalidRequest`].
#[utoipa::path(
    patch,
    path = "/api/v1/players/{id}",
    tag = "Players",
    summary = "Edit a player",
    params(
        ("id" = String, Path, description = "Player id"),
    ),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = PlayerDto),
        (status = 400, description = "Blank name", body = ErrorResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePlayerRequest>,
) -> Result<impl IntoResponse, LadderError> {
    let player = state
        .ladder_service
        .update_player(&PlayerId::new(id), req.name.as_deref(), req.contact)
        .await?;
    Ok(Json(PlayerDto::from(player)))
}

/// `DELETE /players/{id}` — Remove a player; those below move up.
///
/// # Errors
///
/// Returns [`LadderError::PlayerNotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/v1/players/{id}",
    tag = "Players",
    summary = "Remove a player",
    description = "Removes the player and closes the gap. Their match history is kept.",
    params(
        ("id" = String, Path, description = "Player id"),
    ),
    responses(
        (status = 200, description = "Player removed", body = RemovePlayerResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn remove_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LadderError> {
    let (player, shifted) = state
        .ladder_service
        .remove_player(&PlayerId::new(id))
        .await?;
    Ok(Json(RemovePlayerResponse {
        player: PlayerDto::from(player),
        updated_ranks: rank_map(&shifted),
    }))
}

/// Player management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route(
            "/players/{id}",
            get(get_player).patch(update_player).delete(remove_player),
        )
}
