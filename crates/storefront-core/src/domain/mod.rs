//! Domain entities and pure state transitions.

mod period;
mod submission;
mod suggestion;

pub use period::PeriodKind;
pub use submission::{LimitDecision, LimiterConfig, RateLimitRecord};
pub use suggestion::{
    InputOutcome, NavKey, Suggestion, SuggestionConfig, SuggestionPhase, SuggestionSnapshot,
    SuggestionState,
};
