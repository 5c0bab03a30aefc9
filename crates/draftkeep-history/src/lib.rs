//! Linear undo/redo history for draftkeep.
//!
//! This crate provides snapshot-based editing history that enables:
//! - Undo/redo over arbitrary immutable document states
//! - Truncation of the redo future on a divergent edit
//! - A bounded number of retained entries
//!
//! The history never looks inside a document. Snapshots are compared by
//! identity, so any document representation works.
//!
//! # Example
//!
//! ```
//! use draftkeep_history::{HistoryConfig, HistoryStack};
//!
//! let mut history = HistoryStack::new("A".to_string(), HistoryConfig::default());
//! history.set_current("B".to_string());
//! history.set_current_with(|current| format!("{current}C"));
//!
//! assert_eq!(history.current(), "BC");
//! assert_eq!(history.undo().current(), "B");
//! assert!(history.can_redo());
//! ```

mod history;
mod snapshot;

pub use history::{HistoryConfig, HistoryStack, HistoryStatus};
pub use snapshot::Snapshot;
