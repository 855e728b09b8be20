//! Application state - shared across all handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use storefront_core::domain::SuggestionConfig;
use storefront_core::ports::{
    Clock, ErrorReporter, KeyValueStore, SubmissionLimiter, SuggestionSource,
};
use storefront_infra::{
    CatalogError, InMemoryStore, JsonFileStore, StaticCatalog, SystemClock, TracingReporter,
    WindowedRateLimiter,
};

use crate::config::{AppConfig, LimiterSettings, StoreBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub limiters: Arc<BTreeMap<String, Arc<dyn SubmissionLimiter>>>,
    pub catalog: Arc<dyn SuggestionSource>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub suggestions: SuggestionConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let store = Self::open_store(&config.store).await;

        let catalog = match &config.catalog_path {
            Some(path) => match StaticCatalog::from_json_file(path).await {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        "Failed to load catalog: {}. Using bundled catalog.",
                        e
                    );
                    StaticCatalog::builtin()?
                }
            },
            None => StaticCatalog::builtin()?,
        };

        let state = Self::from_parts(
            &config.limiters,
            store,
            Arc::new(SystemClock),
            Arc::new(catalog),
            config.suggestions.clone(),
        );

        tracing::info!(
            limiters = ?state.limiters.keys().collect::<Vec<_>>(),
            "Application state initialized"
        );

        Ok(state)
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        limiters: &[LimiterSettings],
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        catalog: Arc<dyn SuggestionSource>,
        suggestions: SuggestionConfig,
    ) -> Self {
        let limiters = limiters
            .iter()
            .map(|settings| {
                let limiter: Arc<dyn SubmissionLimiter> = Arc::new(WindowedRateLimiter::new(
                    settings.config.clone(),
                    store.clone(),
                    clock.clone(),
                ));
                (settings.name.clone(), limiter)
            })
            .collect();

        Self {
            limiters: Arc::new(limiters),
            catalog,
            reporter: Arc::new(TracingReporter),
            suggestions,
        }
    }

    pub fn limiter(&self, name: &str) -> Option<&Arc<dyn SubmissionLimiter>> {
        self.limiters.get(name)
    }

    /// Open the configured store, falling back to memory when it is unusable.
    async fn open_store(backend: &StoreBackend) -> Arc<dyn KeyValueStore> {
        match backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store. Submission counts reset on restart.");
                Arc::new(InMemoryStore::new())
            }
            StoreBackend::File(path) => match JsonFileStore::open(path).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        "Failed to open file store: {}. Using in-memory fallback.",
                        e
                    );
                    Arc::new(InMemoryStore::new())
                }
            },
            #[cfg(feature = "redis")]
            StoreBackend::Redis => match storefront_infra::RedisStore::from_env().await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!("Failed to connect to Redis: {}. Using in-memory fallback.", e);
                    Arc::new(InMemoryStore::new())
                }
            },
            #[cfg(not(feature = "redis"))]
            StoreBackend::Redis => {
                tracing::warn!("Built without redis feature - using in-memory store");
                Arc::new(InMemoryStore::new())
            }
        }
    }
}
