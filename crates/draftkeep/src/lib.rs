//! Editor session state for long-lived form content.
//!
//! `draftkeep` ties three pieces together for one editing surface:
//! - [`HistoryStack`]: linear undo/redo over document snapshots
//! - [`ShortcutDispatcher`]: modifier chords mapped to editor commands
//! - [`DraftRecoverySession`]: a one-time offer to restore an interrupted draft
//!
//! [`EditorSession`] owns the history and the recovery offer and builds a
//! dispatcher whose undo/redo commands drive that history.
//!
//! # Example
//!
//! ```
//! use draftkeep::{EditorSession, NeverConfirm, SessionConfig, ShortcutHandlers};
//!
//! let session = EditorSession::open("saved body".to_string(), None, None, SessionConfig::default());
//! session.set_current("edited body".to_string());
//! assert!(session.is_dirty());
//!
//! let dispatcher = session
//!     .dispatcher(ShortcutHandlers::new(), NeverConfirm)
//!     .attach();
//! # drop(dispatcher);
//! session.undo();
//! assert_eq!(*session.current(), "saved body");
//! ```

pub mod config;
pub mod error;
mod session;

pub use config::{SessionConfig, ShortcutConfig};
pub use error::{SessionError, SessionResult};
pub use session::EditorSession;

pub use draftkeep_history::{HistoryConfig, HistoryStack, HistoryStatus, Snapshot};
pub use draftkeep_recovery::{
    DraftRecord, DraftRecoverySession, DraftStore, MemoryDraftStore, RecoveryDecision,
    RecoveryError, RecoveryOffer,
};
pub use draftkeep_shortcut::{
    bindings, AlwaysConfirm, AttachedDispatcher, Chord, Command, Confirm, KeyOutcome,
    NeverConfirm, ShortcutBinding, ShortcutDispatcher, ShortcutHandlers,
};
pub use draftkeep_util::{log, LogConfig, LogLevel};
