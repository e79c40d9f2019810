//! Ladder error types with HTTP status code mapping.
//!
//! [`LadderError`] is the central error type for the engine and the
//! gateway around it. Each variant maps to a specific HTTP status code and
//! structured JSON error response. Every error is local and synchronous;
//! nothing in the engine retries.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::roster::InvariantViolation;
use crate::domain::{MatchId, PlayerId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "player not found: ghost",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error enum shared by the engine, the service and the REST layer.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                  |
/// |-----------|-----------------------|------------------------------|
/// | 1000–1999 | Validation            | 400 Bad Request              |
/// | 2000–2999 | Not Found / Conflict  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server                | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    /// Winner or loser id is absent from the roster.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// No ledger entry with the given id.
    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    /// Roster ranks are not a dense `1..=N` sequence.
    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),

    /// Reversal requested for a record without a pre-match snapshot.
    #[error("match {0} has no roster snapshot; it cannot be reversed")]
    NoSnapshotAvailable(MatchId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),
}

impl LadderError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::PlayerNotFound(_) => 2001,
            Self::MatchNotFound(_) => 2002,
            Self::NoSnapshotAvailable(_) => 2003,
            Self::InvariantViolation(_) => 2004,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PlayerNotFound(_) | Self::MatchNotFound(_) => StatusCode::NOT_FOUND,
            Self::NoSnapshotAvailable(_) | Self::InvariantViolation(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns extra detail lines, when the variant carries any.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvariantViolation(violation) => Some(
                violation
                    .violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for LadderError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for LadderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::roster::RankViolation;

    #[test]
    fn not_found_maps_to_404() {
        let err = LadderError::PlayerNotFound(PlayerId::from("ghost"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.to_string(), "player not found: ghost");
    }

    #[test]
    fn missing_snapshot_is_a_conflict() {
        let err = LadderError::NoSnapshotAvailable(MatchId::new());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn invariant_violation_lists_details() {
        let err = LadderError::from(InvariantViolation {
            violations: vec![
                RankViolation::Missing { rank: 2 },
                RankViolation::Duplicate {
                    rank: 1,
                    players: vec![PlayerId::from("a"), PlayerId::from("b")],
                },
            ],
        });
        let Some(details) = err.details() else {
            panic!("expected details");
        };
        assert!(details.contains("rank 2 is unoccupied"));
        assert!(details.contains("; "));
        assert_eq!(err.error_code(), 2004);
    }

    #[test]
    fn response_carries_status() {
        let response = LadderError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
