//! Persistence layer: PostgreSQL storage for the roster and the ledger.
//!
//! The engine computes one target diff per operation; this layer applies
//! it, together with the matching ledger change, in a single transaction.
//! The concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
