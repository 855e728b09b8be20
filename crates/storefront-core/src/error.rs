//! Domain-level error types.

use std::fmt;

use thiserror::Error;

/// Domain errors - configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Failure categories surfaced to error-reporting collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A persisted record could not be parsed and was treated as absent.
    StorageCorrupt,
    /// The suggestion source rejected a lookup.
    LookupFailed,
    /// A component was constructed with unusable settings.
    InvalidConfig,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::StorageCorrupt => "storage_corrupt",
            ErrorKind::LookupFailed => "lookup_failed",
            ErrorKind::InvalidConfig => "invalid_config",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DomainError::InvalidConfig("max_per_period must be at least 1".into()).to_string(),
            "Invalid configuration: max_per_period must be at least 1"
        );
        assert_eq!(
            DomainError::Validation("unsupported key 'Tab'".into()).to_string(),
            "Validation failed: unsupported key 'Tab'"
        );
        assert_eq!(ErrorKind::StorageCorrupt.to_string(), "storage_corrupt");
        assert_eq!(ErrorKind::LookupFailed.to_string(), "lookup_failed");
    }
}
