//! Suggestion source port.

use async_trait::async_trait;

use crate::domain::Suggestion;

/// Provides candidate completions for a query, most relevant first.
///
/// Latency is unbounded from the caller's point of view.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, LookupError>;
}

/// Lookup errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("Suggestion source unavailable: {0}")]
    Unavailable(String),

    #[error("Lookup failed: {0}")]
    Backend(String),
}
