//! Draft records produced by autosave.

use chrono::{DateTime, Utc};
use draftkeep_history::Snapshot;
use serde::{Deserialize, Serialize};

/// An autosaved snapshot captured outside the normal save flow.
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftRecord<T> {
    /// The autosaved document state.
    pub snapshot: Snapshot<T>,

    /// When the autosave happened.
    pub saved_at: DateTime<Utc>,
}

impl<T> Clone for DraftRecord<T> {
    fn clone(&self) -> Self {
        Self {
            snapshot: self.snapshot.clone(),
            saved_at: self.saved_at,
        }
    }
}

impl<T> DraftRecord<T> {
    /// Create a draft record stamped with the current time.
    pub fn new(value: T) -> Self {
        Self::at(value, Utc::now())
    }

    /// Create a draft record with an explicit timestamp.
    pub fn at(value: T, saved_at: DateTime<Utc>) -> Self {
        Self {
            snapshot: Snapshot::new(value),
            saved_at,
        }
    }

    /// Whether this draft was written strictly after `last_saved_at`.
    ///
    /// With no known save, any draft counts as newer.
    pub fn is_newer_than(&self, last_saved_at: Option<DateTime<Utc>>) -> bool {
        last_saved_at.map_or(true, |saved| self.saved_at > saved)
    }
}
