//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers cross the wire as plain strings and rank diffs as
//! `{ player_id: rank }` maps.

pub mod common_dto;
pub mod match_dto;
pub mod player_dto;
pub mod roster_dto;

pub use common_dto::*;
pub use match_dto::*;
pub use player_dto::*;
pub use roster_dto::*;
