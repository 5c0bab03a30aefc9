//! Snapshot history with a single cursor.
//!
//! ```text
//! push(C) after undo from B
//!
//!   before:  [A, B, X, Y]   cursor = 1 (B)
//!   after:   [A, B, C]      cursor = 2 (C)   X and Y are gone
//! ```

use crate::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Configuration for a history stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of retained entries, including the current one.
    /// Oldest entries are dropped past this bound. `None` keeps everything.
    pub max_entries: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(100),
        }
    }
}

impl HistoryConfig {
    /// Create a configuration with the given entry limit.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
        }
    }

    /// Keep every entry for the lifetime of the stack.
    pub fn unlimited() -> Self {
        Self { max_entries: None }
    }

    fn capacity(&self) -> usize {
        self.max_entries.map_or(usize::MAX, |n| n.max(1))
    }
}

/// Position of the cursor, as exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStatus {
    /// Index of the current entry.
    pub cursor: usize,
    /// Number of retained entries.
    pub len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Linear undo/redo history over snapshots of one document.
///
/// # Invariants
///
/// 1. `entries` is never empty; it is seeded on construction and [`reset`](Self::reset).
/// 2. `cursor < entries.len()`, and `entries[cursor]` is the current value.
/// 3. A push discards every entry after the cursor.
/// 4. `entries.len()` never exceeds the configured capacity.
pub struct HistoryStack<T> {
    entries: VecDeque<Snapshot<T>>,
    cursor: usize,
    config: HistoryConfig,
}

impl<T: fmt::Debug> fmt::Debug for HistoryStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStack")
            .field("cursor", &self.cursor)
            .field("len", &self.entries.len())
            .field("current", self.current())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> HistoryStack<T> {
    /// Start a history seeded with the initial document.
    pub fn new(seed: T, config: HistoryConfig) -> Self {
        Self::from_snapshot(Snapshot::new(seed), config)
    }

    /// Start a history seeded with an existing snapshot.
    pub fn from_snapshot(seed: Snapshot<T>, config: HistoryConfig) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(seed);
        Self {
            entries,
            cursor: 0,
            config,
        }
    }

    /// Append a new value after the cursor and make it current.
    ///
    /// Always appends, even when `value` equals the current value: a fresh
    /// value is a fresh snapshot.
    pub fn push_state(&mut self, value: T) -> &Self {
        self.push_snapshot(Snapshot::new(value))
    }

    /// Append a snapshot after the cursor and make it current.
    ///
    /// Entries after the cursor are discarded. This is the only push that can
    /// be a no-op: if `snapshot` is the current entry (same allocation, see
    /// [`Snapshot::ptr_eq`]), nothing is appended and the redo branch is kept.
    pub fn push_snapshot(&mut self, snapshot: Snapshot<T>) -> &Self {
        if snapshot.ptr_eq(self.snapshot()) {
            return self;
        }

        let discarded = self.entries.len() - self.cursor - 1;
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        self.cursor = self.entries.len() - 1;

        let evicted = self.enforce_capacity();
        if discarded > 0 || evicted > 0 {
            debug!(
                discarded,
                evicted,
                len = self.entries.len(),
                "History truncated on push"
            );
        }
        self
    }

    /// Replace the current value with `value` as a new entry.
    pub fn set_current(&mut self, value: T) -> &Self {
        self.push_state(value)
    }

    /// Compute the next value from the current one and push it.
    pub fn set_current_with<F>(&mut self, updater: F) -> &Self
    where
        F: FnOnce(&T) -> T,
    {
        let next = updater(self.current());
        self.push_state(next)
    }

    /// Step back one entry. Does nothing at the oldest entry.
    pub fn undo(&mut self) -> &Self {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self
    }

    /// Step forward one entry. Does nothing at the newest entry.
    pub fn redo(&mut self) -> &Self {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
        self
    }

    /// Drop all entries and start over from `seed`.
    pub fn reset(&mut self, seed: T) -> &Self {
        self.reset_to(Snapshot::new(seed))
    }

    /// Drop all entries and start over from an existing snapshot.
    pub fn reset_to(&mut self, seed: Snapshot<T>) -> &Self {
        debug!(dropped = self.entries.len(), "History reset");
        self.entries.clear();
        self.entries.push_back(seed);
        self.cursor = 0;
        self
    }

    /// The current document value.
    pub fn current(&self) -> &T {
        self.snapshot()
    }

    /// The current snapshot handle.
    pub fn snapshot(&self) -> &Snapshot<T> {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its seed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position and undo/redo availability.
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            cursor: self.cursor,
            len: self.entries.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Snapshot<T>> {
        self.entries.iter()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Evict the oldest entries past capacity. Returns how many were dropped.
    fn enforce_capacity(&mut self) -> usize {
        let capacity = self.config.capacity();
        let mut evicted = 0;
        while self.entries.len() > capacity {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
            evicted += 1;
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(seed: &str) -> HistoryStack<String> {
        HistoryStack::new(seed.to_string(), HistoryConfig::unlimited())
    }

    fn values(history: &HistoryStack<String>) -> Vec<String> {
        history.entries().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_history_has_seed_only() {
        let h = history("A");
        assert_eq!(h.current(), "A");
        assert_eq!(h.len(), 1);
        assert!(!h.is_empty());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn test_reset_set_undo_redo_scenario() {
        let mut h = history("seed");
        h.reset("A".to_string());
        h.set_current("B".to_string());
        h.set_current("C".to_string());

        assert_eq!(h.undo().current(), "B");
        assert_eq!(h.undo().current(), "A");
        assert_eq!(h.undo().current(), "A");
        assert_eq!(h.redo().current(), "B");
    }

    #[test]
    fn test_push_after_undo_discards_redo_branch() {
        let mut h = history("A");
        h.push_state("B".to_string());
        h.push_state("C".to_string());
        h.undo();
        h.undo();
        h.push_state("X".to_string());

        assert_eq!(values(&h), vec!["A", "X"]);
        assert!(!h.can_redo());
        assert_eq!(h.redo().current(), "X");
    }

    #[test]
    fn test_undo_at_bottom_is_noop() {
        let mut h = history("A");
        let before: Vec<Snapshot<String>> = h.entries().cloned().collect();
        let status = h.status();

        h.undo();

        assert_eq!(h.status(), status);
        assert!(h.entries().zip(&before).all(|(a, b)| a.ptr_eq(b)));
    }

    #[test]
    fn test_redo_at_top_is_noop() {
        let mut h = history("A");
        h.push_state("B".to_string());
        let status = h.status();
        h.redo();
        assert_eq!(h.status(), status);
        assert_eq!(h.current(), "B");
    }

    #[test]
    fn test_push_undo_redo_round_trip() {
        let mut h = history("seed");
        h.push_state("a".to_string());
        h.push_state("b".to_string());
        h.undo();
        h.redo();
        assert_eq!(h.current(), "b");
    }

    #[test]
    fn test_set_current_with_reads_latest_value() {
        let mut h = history("");
        for _ in 0..3 {
            h.set_current_with(|s| format!("{s}x"));
        }
        assert_eq!(h.current(), "xxx");
        assert_eq!(h.len(), 4);
    }

    #[test]
    fn test_pushing_current_snapshot_is_noop() {
        let mut h = history("A");
        h.push_state("B".to_string());
        h.undo();
        let current = h.snapshot().clone();

        h.push_snapshot(current);

        assert_eq!(h.len(), 2);
        assert!(h.can_redo());
    }

    #[test]
    fn test_pushing_equal_value_creates_entry() {
        let mut h = history("A");
        h.push_state("A".to_string());
        h.push_state("A".to_string());
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = HistoryStack::new(0, HistoryConfig::new(3));
        for i in 1..=5 {
            h.push_state(i);
        }
        let kept: Vec<i32> = h.entries().map(|s| **s).collect();
        assert_eq!(kept, vec![3, 4, 5]);
        assert_eq!(h.cursor(), 2);
        assert_eq!(*h.current(), 5);
    }

    #[test]
    fn test_zero_capacity_keeps_current() {
        let mut h = HistoryStack::new(0, HistoryConfig::new(0));
        h.push_state(1);
        assert_eq!(h.len(), 1);
        assert_eq!(*h.current(), 1);
        assert!(!h.can_undo());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut h = history("A");
        h.push_state("B".to_string());
        h.undo();
        h.reset("Z".to_string());
        assert_eq!(values(&h), vec!["Z"]);
        assert_eq!(h.cursor(), 0);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: HistoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_entries, Some(100));

        let config: HistoryConfig = serde_json::from_str(r#"{"max_entries":null}"#).unwrap();
        assert_eq!(config, HistoryConfig::unlimited());
    }
}
