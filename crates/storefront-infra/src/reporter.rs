//! Error reporter that forwards handled failures to `tracing`.
//!
//! Reports are emitted at ERROR level so the server's beacon layer picks them
//! up alongside every other error event.

use storefront_core::ports::{ErrorReport, ErrorReporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, report: ErrorReport) {
        tracing::error!(
            kind = %report.kind,
            context = report.context.as_deref().unwrap_or(""),
            "{}",
            report.message
        );
    }
}
