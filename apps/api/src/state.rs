use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::errors::AppError;
use crate::evaluation::engine::FitEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Set once after the dictionaries load. Evaluations before that fail with `NotReady`.
    engine: Arc<OnceCell<Arc<FitEngine>>>,
}

impl AppState {
    /// State with no engine published yet.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_engine(config: Config, engine: FitEngine) -> Self {
        let state = Self::new(config);
        state.publish_engine(engine);
        state
    }

    /// Publishes the engine. Returns false if one was already set; the first one stays.
    pub fn publish_engine(&self, engine: FitEngine) -> bool {
        self.engine.set(Arc::new(engine)).is_ok()
    }

    pub fn engine(&self) -> Result<Arc<FitEngine>, AppError> {
        self.engine.get().cloned().ok_or(AppError::NotReady)
    }
}
