//! Configuration for an editor session.
//!
//! Configuration is plain JSON; every field is optional:
//!
//! ```json
//! {
//!   "history": { "max_entries": 200 },
//!   "shortcuts": { "enabled": true, "exit_confirm_message": "Leave without saving?" },
//!   "log_level": "debug"
//! }
//! ```

use crate::error::{SessionError, SessionResult};
use draftkeep_history::HistoryConfig;
use draftkeep_shortcut::DEFAULT_EXIT_CONFIRM_MESSAGE;
use draftkeep_util::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Undo/redo history settings.
    pub history: HistoryConfig,

    /// Keyboard shortcut settings.
    pub shortcuts: ShortcutConfig,

    /// Log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

/// Keyboard shortcut settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    /// Whether shortcuts start enabled.
    pub enabled: bool,

    /// Question asked before exiting with unsaved changes.
    pub exit_confirm_message: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exit_confirm_message: DEFAULT_EXIT_CONFIRM_MESSAGE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SessionError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), "Loaded session config");
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Logging setup for this configuration, printing to stderr.
    pub fn log_config(&self) -> LogConfig {
        LogConfig::stderr(self.log_level.unwrap_or_default())
    }
}
