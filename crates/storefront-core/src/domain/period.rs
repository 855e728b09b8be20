//! Calendar windows that submissions are counted against.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Length of the calendar window a limiter counts within.
///
/// Windows are computed on local wall-clock time: a weekly window starts at
/// midnight on Monday (ISO week), a daily window at midnight of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Weekly,
}

impl PeriodKind {
    /// Canonical start of the window containing `now`.
    pub fn window_start_for(self, now: NaiveDateTime) -> NaiveDateTime {
        let day = now.date();
        let start = match self {
            PeriodKind::Daily => day,
            PeriodKind::Weekly => {
                day - Days::new(u64::from(day.weekday().num_days_from_monday()))
            }
        };
        start.and_time(NaiveTime::MIN)
    }

    /// Start of the window after the one containing `now`.
    pub fn next_window_start(self, now: NaiveDateTime) -> NaiveDateTime {
        let start = self.window_start_for(now).date();
        (start + Days::new(self.days())).and_time(NaiveTime::MIN)
    }

    fn days(self) -> u64 {
        match self {
            PeriodKind::Daily => 1,
            PeriodKind::Weekly => 7,
        }
    }

    /// Phrase used in user-facing messages ("3 remaining this week").
    pub fn phrase(self) -> &'static str {
        match self {
            PeriodKind::Daily => "today",
            PeriodKind::Weekly => "this week",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Daily => f.write_str("daily"),
            PeriodKind::Weekly => f.write_str("weekly"),
        }
    }
}

impl FromStr for PeriodKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(PeriodKind::Daily),
            "weekly" | "week" => Ok(PeriodKind::Weekly),
            other => Err(DomainError::InvalidConfig(format!(
                "unknown period kind '{other}', expected 'daily' or 'weekly'"
            ))),
        }
    }
}
