//! Process-wide logging setup shared by the binaries.

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings, ParseLogFormatError};

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(settings: &LogSettings) {
    tracing::init(settings);
}
