//! Submission limiter backed by a key-value store.
//!
//! Each limiter persists a single [`RateLimitRecord`] under its storage key.
//! The check/record pair is not atomic: two processes (or browser tabs) can
//! both pass `check` before either records, so the limit can be exceeded under
//! concurrency. This limiter deters abuse; it is not a security boundary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use storefront_core::ErrorKind;
use storefront_core::domain::{LimitDecision, LimiterConfig, PeriodKind, RateLimitRecord};
use storefront_core::ports::{Clock, KeyValueStore, RateLimitError, StoreError, SubmissionLimiter};

/// Decide whether a submission under `key` is permitted at `now`.
///
/// Never writes to the store.
pub async fn check_limit(
    store: &dyn KeyValueStore,
    key: &str,
    now: NaiveDateTime,
    period: PeriodKind,
    max_per_period: u32,
) -> Result<LimitDecision, RateLimitError> {
    let record = load_record(store, key).await?;
    Ok(LimitDecision::evaluate(
        record.as_ref(),
        now,
        period,
        max_per_period,
    ))
}

/// Count one dispatched submission under `key` and return the stored record.
pub async fn record_submission(
    store: &dyn KeyValueStore,
    key: &str,
    now: NaiveDateTime,
    period: PeriodKind,
) -> Result<RateLimitRecord, RateLimitError> {
    let previous = load_record(store, key).await?;
    let next = RateLimitRecord::advance(previous.as_ref(), now, period);

    let raw = next
        .encode()
        .map_err(|e| RateLimitError::Encode(e.to_string()))?;
    store.set(key, &raw).await?;

    tracing::debug!(
        key = %key,
        count = next.count,
        window_start = %next.window_start,
        "Submission recorded"
    );

    Ok(next)
}

/// Read the record under `key`. Unparseable records are logged and treated as absent.
async fn load_record(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<RateLimitRecord>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match RateLimitRecord::decode(&raw) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            tracing::warn!(
                key = %key,
                kind = %ErrorKind::StorageCorrupt,
                error = %e,
                "Discarding unreadable rate limit record"
            );
            Ok(None)
        }
    }
}

/// One logical limiter: a period, a quota and a storage key over a shared store.
pub struct WindowedRateLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: LimiterConfig,
}

impl WindowedRateLimiter {
    pub fn new(
        config: LimiterConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }
}

#[async_trait]
impl SubmissionLimiter for WindowedRateLimiter {
    fn config(&self) -> &LimiterConfig {
        &self.config
    }

    async fn check(&self) -> Result<LimitDecision, RateLimitError> {
        let decision = check_limit(
            self.store.as_ref(),
            &self.config.storage_key,
            self.clock.now(),
            self.config.period,
            self.config.max_per_period,
        )
        .await?;

        if !decision.allowed {
            tracing::info!(
                key = %self.config.storage_key,
                limit = decision.limit,
                resets_at = %decision.resets_at,
                "Submission limit reached"
            );
        }

        Ok(decision)
    }

    async fn record(&self) -> Result<LimitDecision, RateLimitError> {
        let now = self.clock.now();
        let record = record_submission(
            self.store.as_ref(),
            &self.config.storage_key,
            now,
            self.config.period,
        )
        .await?;

        Ok(LimitDecision::evaluate(
            Some(&record),
            now,
            self.config.period,
            self.config.max_per_period,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::InMemoryStore;
    use chrono::{NaiveDate, TimeDelta};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn limiter(
        config: LimiterConfig,
        start: NaiveDateTime,
    ) -> (WindowedRateLimiter, Arc<InMemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(start));
        let limiter = WindowedRateLimiter::new(config, store.clone(), clock.clone());
        (limiter, store, clock)
    }

    #[tokio::test]
    async fn test_daily_quota_and_rollover() {
        let config = LimiterConfig::daily(2, "product-requests").unwrap();
        let (limiter, _store, clock) = limiter(config, at(14, 9));

        let res = limiter.check().await.unwrap();
        assert!(res.allowed);
        assert_eq!(res.remaining, 2);

        limiter.record().await.unwrap();
        let res = limiter.check().await.unwrap();
        assert!(res.allowed);
        assert_eq!(res.remaining, 1);

        limiter.record().await.unwrap();
        let res = limiter.check().await.unwrap();
        assert!(!res.allowed);
        assert_eq!(res.remaining, 0);

        // Next day - new window
        clock.advance(TimeDelta::days(1));
        let res = limiter.check().await.unwrap();
        assert!(res.allowed);
        assert_eq!(res.remaining, 2);
    }

    #[tokio::test]
    async fn test_count_matches_recorded_calls() {
        let config = LimiterConfig::weekly(5, "analysis").unwrap();
        let (limiter, store, clock) = limiter(config, at(12, 0));

        for calls in 1..=8u32 {
            let decision = limiter.record().await.unwrap();
            clock.advance(TimeDelta::hours(3));

            let raw = store.get("analysis").await.unwrap().unwrap();
            assert_eq!(RateLimitRecord::decode(&raw).unwrap().count, calls);
            assert_eq!(decision.allowed, calls < 5);
        }
    }

    #[tokio::test]
    async fn test_check_is_idempotent() {
        let config = LimiterConfig::weekly(3, "analysis").unwrap();
        let (limiter, store, _clock) = limiter(config, at(14, 12));
        limiter.record().await.unwrap();
        let before = store.get("analysis").await.unwrap();

        let first = limiter.check().await.unwrap();
        for _ in 0..5 {
            assert_eq!(limiter.check().await.unwrap(), first);
        }
        assert_eq!(store.get("analysis").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_record_after_rollover_restarts_at_one() {
        let store = InMemoryStore::new();
        record_submission(&store, "analysis", at(14, 8), PeriodKind::Weekly)
            .await
            .unwrap();
        record_submission(&store, "analysis", at(16, 8), PeriodKind::Weekly)
            .await
            .unwrap();

        // 2026-10-19 is the following Monday.
        let record = record_submission(&store, "analysis", at(19, 0), PeriodKind::Weekly)
            .await
            .unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.window_start, at(19, 0));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reset() {
        let store = InMemoryStore::new();
        store.set("analysis", "not-json").await.unwrap();

        let decision = check_limit(&store, "analysis", at(14, 8), PeriodKind::Weekly, 3)
            .await
            .unwrap();
        assert_eq!(decision.remaining, 3);

        let record = record_submission(&store, "analysis", at(14, 8), PeriodKind::Weekly)
            .await
            .unwrap();
        assert_eq!(record.count, 1);
    }

    #[tokio::test]
    async fn test_future_window_resets() {
        let store = InMemoryStore::new();
        record_submission(&store, "analysis", at(28, 8), PeriodKind::Weekly)
            .await
            .unwrap();

        let record = record_submission(&store, "analysis", at(14, 8), PeriodKind::Weekly)
            .await
            .unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.window_start, at(12, 0));
    }

    #[tokio::test]
    async fn test_limiters_with_distinct_keys_share_a_store() {
        let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(at(14, 10)));
        let analysis = WindowedRateLimiter::new(
            LimiterConfig::weekly(1, "analysis").unwrap(),
            store.clone(),
            clock.clone(),
        );
        let products = WindowedRateLimiter::new(
            LimiterConfig::daily(1, "product-requests").unwrap(),
            store.clone(),
            clock,
        );

        analysis.record().await.unwrap();
        assert!(!analysis.check().await.unwrap().allowed);
        assert!(products.check().await.unwrap().allowed);
        assert_eq!(store.len().await, 1);
    }
}
