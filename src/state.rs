use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::error::ApiError;

/// Shared, read-only request context. Nothing in here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn token_secret(&self) -> &str {
        &self.config.security.token_secret
    }

    /// 500 for a failed operation, honouring `expose_store_errors`.
    pub fn internal_error(&self, context: &str, err: impl std::fmt::Display) -> ApiError {
        ApiError::internal(context, err, self.config.security.expose_store_errors)
    }
}
