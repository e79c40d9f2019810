//! # ladder-gateway
//!
//! REST API and WebSocket gateway for a challenge-ladder ranking engine.
//!
//! Players hold dense ranks `1..=N`. When a lower-ranked player beats a
//! higher-ranked one, the winner takes the loser's slot and everyone in
//! between slides down one place (leapfrog promotion); a defended
//! challenge changes nothing. Every result is recorded with a snapshot of
//! the ranking taken before it was applied, which is what makes reversing
//! or deleting a match possible later.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LadderService (service/)   single writer
//!     ├── EventBus (domain/)
//!     │
//!     ├── LadderState (domain/)      roster + match ledger
//!     ├── Ranking engine (domain/)   pure functions
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
