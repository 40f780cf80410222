//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::config::Config;
use crate::db::sqlite::SqliteStore;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent append-only message log.
    pub store: Arc<SqliteStore>,
    /// Completion-service client (swapped for a stub in tests).
    pub completions: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
