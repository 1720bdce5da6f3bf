// Shared fixtures for the integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use scribe::llm::{Generate, GenerationError, Message};
use scribe::store::SqliteSessionStore;

/// Replays a script of generation outcomes and records every call.
pub struct ScriptedGenerator {
    steps: Mutex<VecDeque<Result<String, u16>>>,
    pub calls: Mutex<Vec<(String, Vec<Message>)>>,
}

impl ScriptedGenerator {
    pub fn new(steps: Vec<Result<String, u16>>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Generate for ScriptedGenerator {
    async fn generate(&self, system: &str, messages: &[Message]) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), messages.to_vec()));
        match self.steps.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(status)) => Err(GenerationError::Upstream {
                status,
                detail: "scripted failure".to_string(),
            }),
            None => Err(GenerationError::EmptyContent),
        }
    }
}

/// In-memory store on a single connection so every query shares one db.
pub async fn memory_store() -> SqliteSessionStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    SqliteSessionStore::new(pool).await.expect("store bootstrap")
}
