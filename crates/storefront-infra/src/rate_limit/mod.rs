//! Calendar-window submission limiting.

mod window;

pub use window::{WindowedRateLimiter, check_limit, record_submission};
