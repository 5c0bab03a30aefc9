//! One-shot draft recovery decision.

use crate::{DraftRecord, DraftStore, RecoveryResult};
use chrono::{DateTime, Utc};
use draftkeep_history::{HistoryStack, Snapshot};
use tracing::{debug, info, warn};

/// The user's answer to a recovery prompt.
///
/// Moves from `Pending` to one of the other two states at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryDecision {
    Pending,
    Restored,
    Discarded,
}

/// What the presentation layer needs to decide whether to prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryOffer {
    /// A draft newer than the last save is waiting for a decision.
    pub has_recoverable: bool,
    /// When the offered draft was autosaved.
    pub saved_at: Option<DateTime<Utc>>,
}

/// Offers an interrupted session's draft for restoration, once.
///
/// A session built without a qualifying draft has nothing to offer and
/// `restore` returns `None`. Restoring twice hands back the same snapshot;
/// after a discard the draft is gone for the life of the session.
pub struct DraftRecoverySession<T> {
    record: Option<DraftRecord<T>>,
    restored: Option<Snapshot<T>>,
    decision: RecoveryDecision,
    store: Option<Box<dyn DraftStore<T>>>,
}

impl<T> DraftRecoverySession<T> {
    /// Create a session for `record`, offered only if it is strictly newer
    /// than `last_saved_at`.
    pub fn new(record: Option<DraftRecord<T>>, last_saved_at: Option<DateTime<Utc>>) -> Self {
        let record = record.filter(|r| {
            let newer = r.is_newer_than(last_saved_at);
            if !newer {
                debug!(
                    draft_saved_at = %r.saved_at,
                    last_saved_at = ?last_saved_at,
                    "Ignoring draft not newer than last save"
                );
            }
            newer
        });

        Self {
            record,
            restored: None,
            decision: RecoveryDecision::Pending,
            store: None,
        }
    }

    /// Load the latest draft from `store` and create a session for it.
    ///
    /// Discarding the draft later clears it from the store.
    pub fn from_store<S>(store: S, last_saved_at: Option<DateTime<Utc>>) -> RecoveryResult<Self>
    where
        S: DraftStore<T> + 'static,
    {
        let record = store.load()?;
        let mut session = Self::new(record, last_saved_at);
        session.store = Some(Box::new(store));
        Ok(session)
    }

    /// Whether there is a draft to offer, and how old it is.
    pub fn offer(&self) -> RecoveryOffer {
        match (&self.record, self.decision) {
            (Some(record), RecoveryDecision::Pending) => RecoveryOffer {
                has_recoverable: true,
                saved_at: Some(record.saved_at),
            },
            _ => RecoveryOffer {
                has_recoverable: false,
                saved_at: None,
            },
        }
    }

    pub fn decision(&self) -> RecoveryDecision {
        self.decision
    }

    /// Accept the draft and return its snapshot.
    ///
    /// Repeated calls return the same snapshot. Returns `None` after a
    /// discard or when nothing was recoverable.
    pub fn restore(&mut self) -> Option<Snapshot<T>> {
        match self.decision {
            RecoveryDecision::Pending => {
                let record = self.record.take()?;
                info!(saved_at = %record.saved_at, "Draft restored");
                self.decision = RecoveryDecision::Restored;
                self.restored = Some(record.snapshot.clone());
                Some(record.snapshot)
            }
            RecoveryDecision::Restored => self.restored.clone(),
            RecoveryDecision::Discarded => None,
        }
    }

    /// Restore the draft and push it into `history` as the current entry.
    ///
    /// Only the first successful restore pushes. Returns whether it did.
    pub fn restore_into(&mut self, history: &mut HistoryStack<T>) -> bool {
        if self.decision != RecoveryDecision::Pending {
            return false;
        }
        match self.restore() {
            Some(snapshot) => {
                history.push_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Throw the draft away. Does nothing once a decision has been made.
    pub fn discard(&mut self) {
        if self.decision != RecoveryDecision::Pending {
            debug!(decision = ?self.decision, "Ignoring discard after decision");
            return;
        }

        self.decision = RecoveryDecision::Discarded;
        let Some(record) = self.record.take() else {
            return;
        };
        info!(saved_at = %record.saved_at, "Draft discarded");

        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!("Failed to clear discarded draft: {}", e);
            }
        }
    }
}
