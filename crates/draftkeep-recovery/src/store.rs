//! Draft storage boundary.

use crate::{DraftRecord, RecoveryError, RecoveryResult};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

/// Where the autosave collaborator keeps the latest draft of a document.
///
/// One store holds at most one draft: the most recent autosave.
pub trait DraftStore<T> {
    /// Read the latest draft, if any.
    fn load(&self) -> RecoveryResult<Option<DraftRecord<T>>>;

    /// Replace the latest draft.
    fn save(&self, record: &DraftRecord<T>) -> RecoveryResult<()>;

    /// Remove the draft so it is not offered again.
    fn clear(&self) -> RecoveryResult<()>;
}

impl<T, S: DraftStore<T> + ?Sized> DraftStore<T> for Arc<S> {
    fn load(&self) -> RecoveryResult<Option<DraftRecord<T>>> {
        (**self).load()
    }

    fn save(&self, record: &DraftRecord<T>) -> RecoveryResult<()> {
        (**self).save(record)
    }

    fn clear(&self) -> RecoveryResult<()> {
        (**self).clear()
    }
}

/// In-memory draft store for testing.
///
/// Drafts are kept as JSON so values go through the same serialization a
/// persistent backend would apply.
pub struct MemoryDraftStore<T> {
    data: RwLock<Option<String>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryDraftStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(None),
            _marker: PhantomData,
        }
    }

    /// Whether a draft is currently stored.
    pub fn has_draft(&self) -> bool {
        self.data.read().map(|d| d.is_some()).unwrap_or(false)
    }
}

impl<T: Serialize> MemoryDraftStore<T> {
    /// Create a store that already holds `record`.
    pub fn with_draft(record: &DraftRecord<T>) -> RecoveryResult<Self> {
        let store = Self::new();
        store.write_json(serde_json::to_string(record)?)?;
        Ok(store)
    }

    fn write_json(&self, json: String) -> RecoveryResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| RecoveryError::LockPoisoned(e.to_string()))?;
        *data = Some(json);
        Ok(())
    }
}

impl<T> Default for MemoryDraftStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> DraftStore<T> for MemoryDraftStore<T> {
    fn load(&self) -> RecoveryResult<Option<DraftRecord<T>>> {
        let data = self
            .data
            .read()
            .map_err(|e| RecoveryError::LockPoisoned(e.to_string()))?;

        match data.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, record: &DraftRecord<T>) -> RecoveryResult<()> {
        self.write_json(serde_json::to_string(record)?)
    }

    fn clear(&self) -> RecoveryResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| RecoveryError::LockPoisoned(e.to_string()))?;
        *data = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_nothing() {
        let store: MemoryDraftStore<String> = MemoryDraftStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(!store.has_draft());
    }

    #[test]
    fn test_save_replaces_previous_draft() {
        let store = MemoryDraftStore::<String>::new();
        store.save(&DraftRecord::new("first".to_string())).unwrap();
        store.save(&DraftRecord::new("second".to_string())).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(*loaded.snapshot, "second");
    }

    #[test]
    fn test_clear_removes_draft() {
        let store = MemoryDraftStore::with_draft(&DraftRecord::new(42u32)).unwrap();
        assert!(store.has_draft());

        store.clear().unwrap();

        assert!(!store.has_draft());
        assert!(store.load().unwrap().is_none());
    }
}
