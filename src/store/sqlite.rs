// src/store/sqlite.rs

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::info;

use crate::workflow::Session;

use super::{SessionRecord, SessionStore, StoreError};

/// Create the SQLite connection pool. SQLite is single-writer with multiple
/// readers, so the pool stays small.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Wrap a pool and make sure the sessions table exists.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                code        TEXT PRIMARY KEY,
                state       TEXT NOT NULL,
                version     INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        info!("session store ready");
        Ok(Self { pool })
    }

    /// Direct pool access for maintenance queries and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, code: &str) -> Result<Option<SessionRecord>, StoreError> {
        let row = sqlx::query("SELECT state, version FROM sessions WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let state: String = row.get("state");
                let version: i64 = row.get("version");
                let session: Session = serde_json::from_str(&state)?;
                Ok(Some(SessionRecord { session, version }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, code: &str, session: &Session, expected: Option<i64>) -> Result<i64, StoreError> {
        let state = serde_json::to_string(session)?;

        match expected {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO sessions (code, state, version, updated_at)
                    VALUES ($1, $2, 1, unixepoch())
                    ON CONFLICT (code) DO NOTHING
                    "#,
                )
                .bind(code)
                .bind(&state)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::Conflict);
                }
                Ok(1)
            }
            Some(version) => {
                let result = sqlx::query(
                    r#"
                    UPDATE sessions
                    SET state = $1, version = version + 1, updated_at = unixepoch()
                    WHERE code = $2 AND version = $3
                    "#,
                )
                .bind(&state)
                .bind(code)
                .bind(version)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::Conflict);
                }
                Ok(version + 1)
            }
        }
    }

    async fn reset(&self, code: &str) -> Result<(), StoreError> {
        let state = serde_json::to_string(&Session::default())?;
        sqlx::query(
            r#"
            INSERT INTO sessions (code, state, version, updated_at)
            VALUES ($1, $2, 1, unixepoch())
            ON CONFLICT (code) DO UPDATE
            SET state = excluded.state,
                version = sessions.version + 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(code)
        .bind(&state)
        .execute(&self.pool)
        .await?;
        info!("session {} reset to defaults", code);
        Ok(())
    }
}
