//! # Storefront Core
//!
//! The domain layer of the storefront.
//! Submission window math, the suggestion list state machine, and the ports
//! that infrastructure must implement. No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, ErrorKind};
