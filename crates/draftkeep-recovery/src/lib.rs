//! Draft recovery for draftkeep.
//!
//! An autosave collaborator writes [`DraftRecord`]s outside the normal save
//! flow. When an editor mounts, a [`DraftRecoverySession`] checks whether
//! the last draft is newer than the last real save and, if so, offers it to
//! the user exactly once: restore it or throw it away.
//!
//! Where drafts live is up to the host. [`DraftStore`] is the boundary;
//! [`MemoryDraftStore`] is a non-persistent implementation for tests.

mod draft;
mod error;
mod session;
mod store;

pub use draft::DraftRecord;
pub use error::{RecoveryError, RecoveryResult};
pub use session::{DraftRecoverySession, RecoveryDecision, RecoveryOffer};
pub use store::{DraftStore, MemoryDraftStore};
