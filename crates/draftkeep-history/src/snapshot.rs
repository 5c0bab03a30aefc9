//! Immutable document snapshots.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// One immutable recorded state of the edited document.
///
/// Cloning a snapshot copies the handle, not the document. Two handles are
/// the same snapshot when [`Snapshot::ptr_eq`] says so; the value inside is
/// never compared.
pub struct Snapshot<T>(Arc<T>);

impl<T> Snapshot<T> {
    /// Wrap a document value.
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Whether both handles refer to the same recorded state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Get the shared document value.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> AsRef<T> for Snapshot<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T> From<Arc<T>> for Snapshot<T> {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&*self.0).finish()
    }
}

impl<T: Serialize> Serialize for Snapshot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Snapshot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Snapshot::new)
    }
}
