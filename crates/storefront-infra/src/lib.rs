//! # Storefront Infrastructure
//!
//! Concrete implementations of the ports defined in `storefront-core`:
//! key-value stores, clocks, the calendar-window submission limiter, the
//! static product catalog and the debounced suggestion engine.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory and file stores only
//! - `redis` - Redis-backed key-value store

pub mod catalog;
pub mod clock;
pub mod rate_limit;
pub mod reporter;
pub mod store;
pub mod suggest;

pub use catalog::{CatalogError, Product, StaticCatalog};
pub use clock::{ManualClock, SystemClock};
pub use rate_limit::{WindowedRateLimiter, check_limit, record_submission};
pub use reporter::TracingReporter;
pub use store::{InMemoryStore, JsonFileStore};
pub use suggest::SuggestionEngine;

#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisStore};
