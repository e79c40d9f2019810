//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    CreatePlayerRequest, MatchDto, MatchListResponse, MatchResultResponse, PaginationMeta,
    PlayerDto, PlayerListResponse, RankEntryDto, RemovePlayerResponse, RenumberResponse,
    RestoreResponse, RestoreWarningDto, SubmitMatchRequest, UpdatePlayerRequest,
    ValidationResponse,
};
use super::handlers::{matches, players, roster, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI 3 document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "ladder-gateway",
        description = "Challenge-ladder ranking engine: roster, match results with leapfrog promotion, reversal and deletion."
    ),
    paths(
        players::create_player,
        players::list_players,
        players::get_player,
        players::update_player,
        players::remove_player,
        matches::submit_match,
        matches::list_matches,
        matches::get_match,
        matches::reverse_match,
        matches::delete_match,
        roster::validate_roster,
        roster::renumber_roster,
        system::health_handler,
    ),
    components(schemas(
        CreatePlayerRequest,
        UpdatePlayerRequest,
        PlayerDto,
        PlayerListResponse,
        RemovePlayerResponse,
        SubmitMatchRequest,
        MatchDto,
        MatchListResponse,
        MatchResultResponse,
        RankEntryDto,
        RestoreResponse,
        RestoreWarningDto,
        ValidationResponse,
        RenumberResponse,
        PaginationMeta,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Players", description = "Roster membership"),
        (name = "Matches", description = "Results, reversal and deletion"),
        (name = "Roster", description = "Invariant checks and repair"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;
