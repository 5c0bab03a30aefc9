//! An editing session over one document.

use crate::config::SessionConfig;
use crate::error::SessionResult;
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use draftkeep_history::{HistoryStack, HistoryStatus, Snapshot};
use draftkeep_recovery::{DraftRecord, DraftRecoverySession, DraftStore, RecoveryOffer};
use draftkeep_shortcut::{Command, Confirm, ShortcutDispatcher, ShortcutHandlers};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::{debug, info};

/// History, dirtiness and draft recovery for one mounted editor.
///
/// The history is shared with the undo/redo handlers of any dispatcher built
/// by [`dispatcher`](Self::dispatcher), so a session and its dispatcher live
/// on the same thread.
pub struct EditorSession<T> {
    history: Rc<RefCell<HistoryStack<T>>>,
    saved: Rc<RefCell<Snapshot<T>>>,
    recovery: DraftRecoverySession<T>,
    config: SessionConfig,
}

impl<T> EditorSession<T> {
    /// Open a session on the persisted `document`.
    ///
    /// `draft` is offered for recovery if it is newer than `last_saved_at`.
    pub fn open(
        document: T,
        draft: Option<DraftRecord<T>>,
        last_saved_at: Option<DateTime<Utc>>,
        config: SessionConfig,
    ) -> Self {
        Self::with_recovery(
            document,
            DraftRecoverySession::new(draft, last_saved_at),
            config,
        )
    }

    /// Open a session, reading the latest draft from `store`.
    pub fn open_with_store<S>(
        document: T,
        store: S,
        last_saved_at: Option<DateTime<Utc>>,
        config: SessionConfig,
    ) -> SessionResult<Self>
    where
        S: DraftStore<T> + 'static,
    {
        let recovery = DraftRecoverySession::from_store(store, last_saved_at)?;
        Ok(Self::with_recovery(document, recovery, config))
    }

    fn with_recovery(document: T, recovery: DraftRecoverySession<T>, config: SessionConfig) -> Self {
        let seed = Snapshot::new(document);
        let history = HistoryStack::from_snapshot(seed.clone(), config.history.clone());
        let offer = recovery.offer();
        info!(
            has_recoverable = offer.has_recoverable,
            max_entries = ?config.history.max_entries,
            "Editor session opened"
        );

        Self {
            history: Rc::new(RefCell::new(history)),
            saved: Rc::new(RefCell::new(seed)),
            recovery,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether to prompt for recovery, and how old the draft is.
    pub fn recovery_offer(&self) -> RecoveryOffer {
        self.recovery.offer()
    }

    pub fn recovery(&self) -> &DraftRecoverySession<T> {
        &self.recovery
    }

    /// Accept the draft and make it the current entry.
    ///
    /// The persisted document stays one undo away. Returns whether the draft
    /// was applied; only the first call can.
    pub fn restore_draft(&mut self) -> bool {
        self.recovery.restore_into(&mut self.history.borrow_mut())
    }

    /// Throw the draft away for the rest of this session.
    pub fn discard_draft(&mut self) {
        self.recovery.discard();
    }

    /// The current document snapshot.
    pub fn current(&self) -> Snapshot<T> {
        self.history.borrow().snapshot().clone()
    }

    pub fn status(&self) -> HistoryStatus {
        self.history.borrow().status()
    }

    pub fn history(&self) -> Ref<'_, HistoryStack<T>> {
        self.history.borrow()
    }

    pub fn history_mut(&self) -> RefMut<'_, HistoryStack<T>> {
        self.history.borrow_mut()
    }

    /// Record an edit.
    pub fn set_current(&self, value: T) -> HistoryStatus {
        self.history.borrow_mut().set_current(value).status()
    }

    /// Record an edit computed from the current value.
    pub fn update<F>(&self, updater: F) -> HistoryStatus
    where
        F: FnOnce(&T) -> T,
    {
        self.history.borrow_mut().set_current_with(updater).status()
    }

    pub fn undo(&self) -> HistoryStatus {
        self.history.borrow_mut().undo().status()
    }

    pub fn redo(&self) -> HistoryStatus {
        self.history.borrow_mut().redo().status()
    }

    /// Load a different document into this editor, dropping all history.
    pub fn load_document(&self, document: T) {
        let seed = Snapshot::new(document);
        self.history.borrow_mut().reset_to(seed.clone());
        *self.saved.borrow_mut() = seed;
        debug!("Document loaded");
    }

    /// Record the current snapshot as persisted.
    pub fn mark_saved(&self) {
        let current = self.current();
        *self.saved.borrow_mut() = current;
        debug!("Document marked saved");
    }

    /// Whether the current snapshot differs from the last persisted one.
    ///
    /// Undoing back to the saved snapshot makes the document clean again.
    pub fn is_dirty(&self) -> bool {
        is_dirty(&self.history, &self.saved)
    }
}

impl<T: 'static> EditorSession<T> {
    /// Build a shortcut dispatcher for this session.
    ///
    /// Undo and redo drive the session history unless `handlers` already
    /// registers them. Dirtiness is read from the session at each Escape.
    pub fn dispatcher(
        &self,
        mut handlers: ShortcutHandlers,
        confirm: impl Confirm + 'static,
    ) -> ShortcutDispatcher {
        if !handlers.is_registered(Command::Undo) {
            let history = Rc::clone(&self.history);
            handlers = handlers.on(Command::Undo, move || {
                history
                    .try_borrow_mut()
                    .map_err(|_| anyhow!("history is busy"))?
                    .undo();
                Ok(())
            });
        }
        if !handlers.is_registered(Command::Redo) {
            let history = Rc::clone(&self.history);
            handlers = handlers.on(Command::Redo, move || {
                history
                    .try_borrow_mut()
                    .map_err(|_| anyhow!("history is busy"))?
                    .redo();
                Ok(())
            });
        }

        let history = Rc::clone(&self.history);
        let saved = Rc::clone(&self.saved);
        ShortcutDispatcher::new(handlers, confirm)
            .with_exit_message(self.config.shortcuts.exit_confirm_message.clone())
            .with_enabled(self.config.shortcuts.enabled)
            .with_dirty_probe(move || is_dirty(&history, &saved))
    }
}

/// A history that cannot be read right now counts as dirty, so exit asks.
fn is_dirty<T>(history: &RefCell<HistoryStack<T>>, saved: &RefCell<Snapshot<T>>) -> bool {
    match (history.try_borrow(), saved.try_borrow()) {
        (Ok(history), Ok(saved)) => !history.snapshot().ptr_eq(&saved),
        _ => true,
    }
}
