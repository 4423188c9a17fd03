//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use missive_core::{HealthReporter, MessageService, SqliteStore};

use crate::config::Config;

/// State shared across all HTTP handlers.
///
/// Built once in `main` (or in tests) from an already-connected store; no
/// process-wide registry is involved.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Validation and representation layer over the message store.
    pub messages: MessageService<SqliteStore>,
    /// Time-boxed store probe behind `/health`.
    pub health: Arc<HealthReporter<SqliteStore>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<SqliteStore>) -> Self {
        let health = HealthReporter::new(Arc::clone(&store)).with_timeout(config.health_timeout);
        Self {
            config: Arc::new(config),
            messages: MessageService::new(store),
            health: Arc::new(health),
        }
    }
}
