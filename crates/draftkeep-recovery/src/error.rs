//! Recovery error types.

use thiserror::Error;

/// Result type for draft store operations.
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Errors raised by a [`DraftStore`](crate::DraftStore).
///
/// The recovery session itself never fails; these only come from the
/// storage boundary.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// Draft could not be serialized or deserialized.
    #[error("Draft serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// The backing store reported a failure.
    #[error("Draft store error: {0}")]
    Store(String),
}

impl RecoveryError {
    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}
