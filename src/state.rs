// src/state.rs

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::llm::Generate;
use crate::store::SessionStore;
use crate::workflow::EngineOptions;

/// Shared handles for the HTTP handlers.
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub generator: Arc<dyn Generate>,
    pub engine_options: EngineOptions,
    /// The session-code validation collaborator: membership in this set is
    /// the whole authentication contract.
    pub access_codes: HashSet<String>,
    /// One async mutex per session code. The engine performs an
    /// unconditional read-modify-write cycle, so turns for the same code
    /// must be serialized; the store-level compare-and-set is the backstop
    /// for writers outside this process.
    turn_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn Generate>,
        engine_options: EngineOptions,
        access_codes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            store,
            generator,
            engine_options,
            access_codes: access_codes.into_iter().collect(),
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_valid_code(&self, code: &str) -> bool {
        self.access_codes.contains(code)
    }

    /// The per-code turn lock, created on first use.
    pub fn turn_lock(&self, code: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.turn_locks.lock().expect("turn lock map poisoned");
        locks.entry(code.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerationError, Message};
    use async_trait::async_trait;

    struct NoopGenerator;

    #[async_trait]
    impl Generate for NoopGenerator {
        async fn generate(&self, _: &str, _: &[Message]) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyContent)
        }
    }

    struct NoopStore;

    #[async_trait]
    impl SessionStore for NoopStore {
        async fn get(
            &self,
            _: &str,
        ) -> Result<Option<crate::store::SessionRecord>, crate::store::StoreError> {
            Ok(None)
        }
        async fn put(
            &self,
            _: &str,
            _: &crate::workflow::Session,
            _: Option<i64>,
        ) -> Result<i64, crate::store::StoreError> {
            Ok(1)
        }
        async fn reset(&self, _: &str) -> Result<(), crate::store::StoreError> {
            Ok(())
        }
    }

    fn state_with_codes(codes: &[&str]) -> AppState {
        AppState::new(
            Arc::new(NoopStore),
            Arc::new(NoopGenerator),
            EngineOptions::default(),
            codes.iter().map(|c| c.to_string()),
        )
    }

    #[test]
    fn code_membership_is_the_auth_contract() {
        let state = state_with_codes(&["alpha"]);
        assert!(state.is_valid_code("alpha"));
        assert!(!state.is_valid_code("beta"));
    }

    #[test]
    fn same_code_shares_one_lock() {
        let state = state_with_codes(&[]);
        let a = state.turn_lock("x");
        let b = state.turn_lock("x");
        let c = state.turn_lock("y");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
