//! Submission rate limiting port.

use async_trait::async_trait;

use super::store::StoreError;
use crate::domain::{LimitDecision, LimiterConfig};

/// A limiter for one logical kind of submission.
///
/// `check` is a pure read. `record` must only be called once the guarded
/// action was actually dispatched; the pair is not atomic.
#[async_trait]
pub trait SubmissionLimiter: Send + Sync {
    fn config(&self) -> &LimiterConfig;

    /// Decide whether another submission is permitted right now.
    async fn check(&self) -> Result<LimitDecision, RateLimitError>;

    /// Count one dispatched submission and return the decision that follows it.
    async fn record(&self) -> Result<LimitDecision, RateLimitError>;
}

/// Rate limit errors. Denial is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Failed to encode record: {0}")]
    Encode(String),
}
