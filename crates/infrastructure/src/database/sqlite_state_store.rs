use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite, sqlite::SqlitePoolOptions};
use tracing::debug;

use domain::entity::{EntityState, StateRepository};
use domain::DomainError;

/// Restore store keeping the last scalar state of every entity in SQLite.
#[derive(Clone)]
pub struct SqliteStateStore {
    pool: Pool<Sqlite>,
}

impl SqliteStateStore {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1) // SQLite is single-writer
            .connect(connection_string)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS entity_states (
                entity_id TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn storage_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::Storage(e.to_string())
}

#[async_trait]
impl StateRepository for SqliteStateStore {
    async fn last_state(&self, entity_id: &str) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar("SELECT state FROM entity_states WHERE entity_id = ?")
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn save_snapshot(&self, states: &[EntityState]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        for state in states {
            sqlx::query(
                "INSERT INTO entity_states (entity_id, state, updated_at)
                 VALUES (?, ?, ?)
                 ON CONFLICT(entity_id) DO UPDATE SET
                    state = excluded.state,
                    updated_at = excluded.updated_at",
            )
            .bind(&state.entity_id)
            .bind(state.persisted_value())
            .bind(state.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }
        tx.commit().await.map_err(storage_error)?;

        debug!(count = states.len(), "Saved entity snapshot");
        Ok(())
    }
}
