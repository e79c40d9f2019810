//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams [`crate::domain::LadderEvent`]s to clients
//! that follow specific players (or `"*"` for the whole ladder) and answers
//! read-only roster queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
