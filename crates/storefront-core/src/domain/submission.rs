//! Submission counting records and the permission decisions derived from them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::period::PeriodKind;
use crate::error::DomainError;

/// Persisted submission counter for one limiter key.
///
/// Stored as JSON: `{"count":2,"windowStart":"2026-10-12T00:00:00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_start: NaiveDateTime,
}

impl RateLimitRecord {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Submissions counted inside `window_start`.
    ///
    /// Any other stored window, including one in the future after clock skew,
    /// counts as a fresh window.
    pub fn count_in(&self, window_start: NaiveDateTime) -> u32 {
        if self.window_start == window_start {
            self.count
        } else {
            0
        }
    }

    /// The record to persist after one more submission at `now`.
    pub fn advance(previous: Option<&Self>, now: NaiveDateTime, period: PeriodKind) -> Self {
        let window_start = period.window_start_for(now);
        let count = previous
            .map(|record| record.count_in(window_start))
            .unwrap_or(0)
            .saturating_add(1);

        Self {
            count,
            window_start,
        }
    }
}

/// Outcome of a permission check. Denial is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub period: PeriodKind,
    /// When the next window opens.
    pub resets_at: NaiveDateTime,
}

impl LimitDecision {
    /// Decide whether another submission is permitted at `now`.
    ///
    /// A `max_per_period` of zero always denies.
    pub fn evaluate(
        record: Option<&RateLimitRecord>,
        now: NaiveDateTime,
        period: PeriodKind,
        max_per_period: u32,
    ) -> Self {
        let window_start = period.window_start_for(now);
        let used = record.map(|r| r.count_in(window_start)).unwrap_or(0);
        let remaining = max_per_period.saturating_sub(used);

        Self {
            allowed: remaining > 0,
            remaining,
            limit: max_per_period,
            period,
            resets_at: period.next_window_start(now),
        }
    }

    /// User-facing summary of the decision.
    pub fn message(&self) -> String {
        if self.allowed {
            format!(
                "{} {} remaining {}.",
                self.remaining,
                submissions(self.remaining),
                self.period.phrase()
            )
        } else {
            format!(
                "You have reached the limit of {} {} {}. Please try again after {}.",
                self.limit,
                submissions(self.limit),
                self.period.phrase(),
                self.resets_at.format("%A, %B %-d")
            )
        }
    }
}

fn submissions(n: u32) -> &'static str {
    if n == 1 { "submission" } else { "submissions" }
}

/// Settings for one logical limiter, e.g. "analysis requests, 3 per week".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterConfig {
    pub period: PeriodKind,
    pub max_per_period: u32,
    pub storage_key: String,
}

impl LimiterConfig {
    pub fn new(
        period: PeriodKind,
        max_per_period: u32,
        storage_key: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let storage_key = storage_key.into();

        if max_per_period == 0 {
            return Err(DomainError::InvalidConfig(format!(
                "limiter '{storage_key}' must allow at least one submission per period"
            )));
        }
        if storage_key.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "limiter storage key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            period,
            max_per_period,
            storage_key,
        })
    }

    pub fn weekly(max_per_period: u32, storage_key: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(PeriodKind::Weekly, max_per_period, storage_key)
    }

    pub fn daily(max_per_period: u32, storage_key: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(PeriodKind::Daily, max_per_period, storage_key)
    }
}
