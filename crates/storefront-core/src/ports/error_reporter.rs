//! Error-reporting collaborator port.

use crate::error::ErrorKind;

/// A failure that was handled locally but should still be surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    /// What was being done, e.g. the query that failed.
    pub context: Option<String>,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Receives handled failures. Must never panic or block.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: ErrorReport);
}
