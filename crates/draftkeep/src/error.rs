//! Error types for the session crate.

use draftkeep_recovery::RecoveryError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for session setup.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while setting up an editor session.
///
/// Editing itself never fails; only configuration loading and reading the
/// draft store can.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`SessionConfig`](crate::SessionConfig).
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Draft store error.
    #[error("draft recovery error: {0}")]
    Recovery(#[from] RecoveryError),
}
