//! RAII-based timing for command handlers.
//!
//! # Example
//!
//! ```rust
//! use draftkeep_util::timing::TimingGuard;
//!
//! fn save() {
//!     let _timing = TimingGuard::command("save");
//!     // ... handler body ...
//!     // Duration is logged when _timing is dropped
//! }
//! # save();
//! ```

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// RAII guard that measures and logs the duration of an operation.
///
/// Handlers run on the input thread, so anything longer than a frame is
/// reported at info and anything that visibly stalls input at warn.
pub struct TimingGuard {
    /// Type of operation (e.g., "command").
    operation_type: &'static str,
    /// Name of the specific operation (e.g., "save", "undo").
    operation_name: String,
    start: Instant,
    info_threshold_ms: u64,
    warn_threshold_ms: u64,
}

impl TimingGuard {
    /// Create a new timing guard.
    pub fn new(operation_type: &'static str, operation_name: impl Into<String>) -> Self {
        Self {
            operation_type,
            operation_name: operation_name.into(),
            start: Instant::now(),
            info_threshold_ms: 16,
            warn_threshold_ms: 250,
        }
    }

    /// Create a timing guard for a shortcut command handler.
    pub fn command(name: impl Into<String>) -> Self {
        Self::new("command", name)
    }

    /// Get the elapsed time so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis() as u64;

        if duration_ms >= self.warn_threshold_ms {
            warn!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                "Slow operation completed"
            );
        } else if duration_ms >= self.info_threshold_ms {
            info!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                "Operation completed"
            );
        } else {
            debug!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                "Operation completed"
            );
        }
    }
}
