// src/store/mod.rs
// Durable session persistence behind a narrow get / compare-and-set
// contract.

pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::workflow::Session;

pub use sqlite::SqliteSessionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer advanced the session since it was read.
    #[error("session was modified concurrently")]
    Conflict,
    #[error("failed to encode session state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("session store query failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored session together with its write version.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session: Session,
    pub version: i64,
}

/// Key-value mapping from session code to serialized session state. `put`
/// is a compare-and-set: passing the version observed at `get` time makes
/// concurrent lost updates detectable instead of silent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, code: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Write `session` under `code`. `expected` is `None` for a first
    /// write (fails with `Conflict` if a record appeared meanwhile) or the
    /// previously observed version. Returns the new version.
    async fn put(&self, code: &str, session: &Session, expected: Option<i64>) -> Result<i64, StoreError>;

    /// Overwrite with the default session state, history cleared.
    async fn reset(&self, code: &str) -> Result<(), StoreError>;
}
