//! Ports - trait definitions for external collaborators.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod error_reporter;
mod rate_limit;
mod store;
mod suggestion_source;

pub use clock::Clock;
pub use error_reporter::{ErrorReport, ErrorReporter};
pub use rate_limit::{RateLimitError, SubmissionLimiter};
pub use store::{KeyValueStore, StoreError};
pub use suggestion_source::{LookupError, SuggestionSource};
