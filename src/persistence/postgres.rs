//! PostgreSQL implementation of the persistence layer.
//!
//! Every public write runs inside one transaction, so the rank diff of a
//! logical operation and its ledger change land together or not at all.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{MatchRow, PlayerRow, rank_column};
use crate::config::LadderConfig;
use crate::domain::{MatchId, MatchRecord, Player, PlayerId};
use crate::error::LadderError;

/// Schema migrations from `migrations/`, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(config: &LadderConfig) -> Result<Self, LadderError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the schema migrations compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), LadderError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| LadderError::PersistenceError(e.to_string()))
    }

    /// Loads every player.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] on database failure or a
    /// corrupt row.
    pub async fn load_players(&self) -> Result<Vec<Player>, LadderError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, name, rank, contact, last_active_at FROM players ORDER BY rank, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Player::try_from).collect()
    }

    /// Loads every ledger entry in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] on database failure.
    pub async fn load_matches(&self) -> Result<Vec<MatchRecord>, LadderError> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT id, winner_id, loser_id, roster_snapshot, occurred_at, reversed_at \
             FROM matches ORDER BY occurred_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }

    /// Upserts players (new joiners, profile edits, renumbering).
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] on database failure.
    pub async fn save_players(&self, players: &[Player]) -> Result<(), LadderError> {
        let mut tx = self.pool.begin().await?;
        upsert_players(&mut tx, players).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Deletes a player and writes the ranks shifted to close the gap.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] on database failure.
    pub async fn delete_player(
        &self,
        player_id: &PlayerId,
        shifted: &[Player],
    ) -> Result<(), LadderError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id.as_str())
            .execute(&mut *tx)
            .await?;
        upsert_players(&mut tx, shifted).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Writes the players touched by a match and appends its record.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] on database failure.
    pub async fn save_match_result(
        &self,
        players: &[Player],
        record: &MatchRecord,
    ) -> Result<(), LadderError> {
        let mut tx = self.pool.begin().await?;
        upsert_players(&mut tx, players).await?;
        sqlx::query(
            "INSERT INTO matches (id, winner_id, loser_id, roster_snapshot, occurred_at, reversed_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*record.id.as_uuid())
        .bind(record.winner_id.as_str())
        .bind(record.loser_id.as_str())
        .bind(record.roster_snapshot.as_ref().map(Json))
        .bind(record.occurred_at)
        .bind(record.reversed_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Writes the ranks restored by a reversal and rewrites the record.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] if the row is gone and
    /// [`LadderError::PersistenceError`] on database failure.
    pub async fn save_reversal(
        &self,
        players: &[Player],
        record: &MatchRecord,
    ) -> Result<(), LadderError> {
        let mut tx = self.pool.begin().await?;
        upsert_players(&mut tx, players).await?;
        let result = sqlx::query(
            "UPDATE matches SET winner_id = $2, loser_id = $3, reversed_at = $4 WHERE id = $1",
        )
        .bind(*record.id.as_uuid())
        .bind(record.winner_id.as_str())
        .bind(record.loser_id.as_str())
        .bind(record.reversed_at)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(LadderError::MatchNotFound(record.id));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Writes the ranks restored by a deletion and removes the record.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] on database failure.
    pub async fn delete_match(
        &self,
        match_id: MatchId,
        restored: &[Player],
    ) -> Result<(), LadderError> {
        let mut tx = self.pool.begin().await?;
        upsert_players(&mut tx, restored).await?;
        sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(*match_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn upsert_players(
    tx: &mut Transaction<'_, Postgres>,
    players: &[Player],
) -> Result<(), LadderError> {
    for player in players {
        sqlx::query(
            "INSERT INTO players (id, name, rank, contact, last_active_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, rank = EXCLUDED.rank, \
             contact = EXCLUDED.contact, last_active_at = EXCLUDED.last_active_at",
        )
        .bind(player.id.as_str())
        .bind(&player.name)
        .bind(rank_column(&player.id, player.rank)?)
        .bind(player.contact.as_deref())
        .bind(player.last_active_at)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
