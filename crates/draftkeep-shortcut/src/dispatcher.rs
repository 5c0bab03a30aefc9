//! Shortcut dispatch and its attach/detach lifecycle.

use crate::binding::{self, Command};
use crate::confirm::Confirm;
use crate::handlers::ShortcutHandlers;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use draftkeep_util::TimingGuard;
use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Default question asked before exiting with unsaved changes.
pub const DEFAULT_EXIT_CONFIRM_MESSAGE: &str =
    "You have unsaved changes. Are you sure you want to leave?";

/// Number of dispatchers currently attached in this process.
static ATTACHED: AtomicUsize = AtomicUsize::new(0);

/// How many dispatchers are attached right now.
///
/// More than one attached to the same editing surface means commands fire
/// more than once; the embedding application is expected to prevent that.
pub fn attached_dispatchers() -> usize {
    ATTACHED.load(Ordering::SeqCst)
}

/// What happened to a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a shortcut, or the dispatcher is disabled. Let the host handle it.
    PassThrough,
    /// A binding matched and its command was dispatched.
    Handled {
        command: Command,
        prevent_default: bool,
    },
    /// Escape with unsaved changes, and the user chose to stay.
    ExitDeclined,
    /// Escape while an exit confirmation is still open.
    ExitBusy,
}

impl KeyOutcome {
    /// Whether the host should suppress its default handling of the key.
    pub fn prevents_default(&self) -> bool {
        matches!(
            self,
            KeyOutcome::Handled {
                prevent_default: true,
                ..
            }
        )
    }

    /// The dispatched command, if any.
    pub fn command(&self) -> Option<Command> {
        match self {
            KeyOutcome::Handled { command, .. } => Some(*command),
            _ => None,
        }
    }
}

/// Routes key chords to command handlers.
///
/// A dispatcher does nothing until [`attach`](Self::attach)ed. Dirtiness and
/// the enabled flag can change between events; handlers cannot.
pub struct ShortcutDispatcher {
    handlers: ShortcutHandlers,
    confirm: Box<dyn Confirm>,
    exit_message: String,
    enabled: Cell<bool>,
    dirty: Cell<bool>,
    dirty_probe: Option<Box<dyn Fn() -> bool>>,
    confirming: Cell<bool>,
    attached: Rc<Cell<bool>>,
}

impl fmt::Debug for ShortcutDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutDispatcher")
            .field("handlers", &self.handlers)
            .field("enabled", &self.enabled.get())
            .field("dirty", &self.is_dirty())
            .field("confirming", &self.confirming.get())
            .field("attached", &self.attached.get())
            .finish()
    }
}

impl ShortcutDispatcher {
    /// Create a dispatcher with the given handlers and confirmation provider.
    pub fn new(handlers: ShortcutHandlers, confirm: impl Confirm + 'static) -> Self {
        Self {
            handlers,
            confirm: Box::new(confirm),
            exit_message: DEFAULT_EXIT_CONFIRM_MESSAGE.to_string(),
            enabled: Cell::new(true),
            dirty: Cell::new(false),
            dirty_probe: None,
            confirming: Cell::new(false),
            attached: Rc::new(Cell::new(false)),
        }
    }

    /// Set the question asked before exiting with unsaved changes.
    pub fn with_exit_message(mut self, message: impl Into<String>) -> Self {
        self.exit_message = message.into();
        self
    }

    /// Read dirtiness from `probe` at each Escape instead of [`set_dirty`](Self::set_dirty).
    pub fn with_dirty_probe<F>(mut self, probe: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.dirty_probe = Some(Box::new(probe));
        self
    }

    /// Set whether the enabled state starts on.
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.set(enabled);
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Report whether the document has unsaved changes.
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    pub fn is_dirty(&self) -> bool {
        match &self.dirty_probe {
            Some(probe) => probe(),
            None => self.dirty.get(),
        }
    }

    pub fn handlers(&self) -> &ShortcutHandlers {
        &self.handlers
    }

    /// Start receiving key events. Dropping the returned guard detaches.
    pub fn attach(self) -> AttachedDispatcher {
        let registration = Registration::acquire(Rc::clone(&self.attached));
        AttachedDispatcher {
            dispatcher: self,
            registration,
        }
    }

    /// Whether this dispatcher is currently receiving events.
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn dispatch(&self, event: &KeyEvent) -> KeyOutcome {
        if !self.enabled.get() || event.kind == KeyEventKind::Release {
            return KeyOutcome::PassThrough;
        }

        let Some(binding) = binding::resolve(event) else {
            return KeyOutcome::PassThrough;
        };

        if binding.command == Command::Exit {
            return self.exit();
        }

        self.invoke(binding.command);
        KeyOutcome::Handled {
            command: binding.command,
            prevent_default: binding.prevents_default(),
        }
    }

    fn exit(&self) -> KeyOutcome {
        if self.confirming.get() {
            debug!("Exit confirmation already open, ignoring escape");
            return KeyOutcome::ExitBusy;
        }

        if self.is_dirty() {
            let accepted = {
                let _open = ConfirmingGuard::enter(&self.confirming);
                self.confirm.confirm(&self.exit_message)
            };
            if !accepted {
                debug!("Exit declined");
                return KeyOutcome::ExitDeclined;
            }
        }

        self.invoke(Command::Exit);
        KeyOutcome::Handled {
            command: Command::Exit,
            prevent_default: false,
        }
    }

    fn invoke(&self, command: Command) {
        let Some(handler) = self.handlers.get(command) else {
            debug!(%command, "No handler registered");
            return;
        };
        let Ok(mut handler) = handler.try_borrow_mut() else {
            warn!(%command, "Handler is already running, skipping re-entrant dispatch");
            return;
        };

        let _timing = TimingGuard::command(command.as_str());
        match panic::catch_unwind(AssertUnwindSafe(|| (*handler)())) {
            Ok(Ok(())) => debug!(%command, "Command handled"),
            Ok(Err(e)) => warn!(%command, "Command handler failed: {:#}", e),
            Err(_) => warn!(%command, "Command handler panicked"),
        }
    }
}

/// Marks an exit confirmation as open for as long as it lives.
struct ConfirmingGuard<'a>(&'a Cell<bool>);

impl<'a> ConfirmingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ConfirmingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// One slot in the process-wide attached count.
struct Registration {
    attached: Rc<Cell<bool>>,
}

impl Registration {
    fn acquire(attached: Rc<Cell<bool>>) -> Self {
        attached.set(true);
        let count = ATTACHED.fetch_add(1, Ordering::SeqCst) + 1;
        if count > 1 {
            warn!(
                attached = count,
                "Multiple shortcut dispatchers attached; commands may fire more than once"
            );
        }
        info!(attached = count, "Shortcut dispatcher attached");
        Self { attached }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.attached.set(false);
        let remaining = ATTACHED.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        info!(attached = remaining, "Shortcut dispatcher detached");
    }
}

/// An attached dispatcher. Detaches when dropped, on every exit path.
pub struct AttachedDispatcher {
    dispatcher: ShortcutDispatcher,
    registration: Registration,
}

impl AttachedDispatcher {
    /// Route one key event.
    pub fn handle_key(&self, event: &KeyEvent) -> KeyOutcome {
        self.dispatcher.dispatch(event)
    }

    /// Route a terminal event. Anything but a key press passes through.
    pub fn handle_event(&self, event: &Event) -> KeyOutcome {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => KeyOutcome::PassThrough,
        }
    }

    /// Stop receiving events and get the dispatcher back.
    pub fn detach(self) -> ShortcutDispatcher {
        let AttachedDispatcher {
            dispatcher,
            registration,
        } = self;
        drop(registration);
        dispatcher
    }
}

impl Deref for AttachedDispatcher {
    type Target = ShortcutDispatcher;

    fn deref(&self) -> &ShortcutDispatcher {
        &self.dispatcher
    }
}

impl fmt::Debug for AttachedDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttachedDispatcher")
            .field(&self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlwaysConfirm, NeverConfirm};
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<Command>>>;

    fn recording(log: &Log, commands: &[Command]) -> ShortcutHandlers {
        commands.iter().fold(ShortcutHandlers::new(), |handlers, &command| {
            let log = Rc::clone(log);
            handlers.on(command, move || {
                log.borrow_mut().push(command);
                Ok(())
            })
        })
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn escape() -> KeyEvent {
        KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_shift_s_fires_only_save_and_exit() {
        let log = Log::default();
        let dispatcher =
            ShortcutDispatcher::new(recording(&log, Command::all()), NeverConfirm).attach();

        let event = KeyEvent::new(
            KeyCode::Char('S'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        let outcome = dispatcher.handle_key(&event);

        assert_eq!(outcome.command(), Some(Command::SaveAndExit));
        assert_eq!(*log.borrow(), vec![Command::SaveAndExit]);
    }

    #[test]
    fn test_ctrl_p_prevents_default_without_handler() {
        let dispatcher = ShortcutDispatcher::new(ShortcutHandlers::new(), NeverConfirm).attach();

        let outcome = dispatcher.handle_key(&ctrl('p'));

        assert_eq!(
            outcome,
            KeyOutcome::Handled {
                command: Command::TogglePublish,
                prevent_default: true
            }
        );
    }

    #[test]
    fn test_unmatched_key_passes_through() {
        let log = Log::default();
        let dispatcher =
            ShortcutDispatcher::new(recording(&log, Command::all()), AlwaysConfirm).attach();

        let outcome = dispatcher.handle_key(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));

        assert_eq!(outcome, KeyOutcome::PassThrough);
        assert!(!outcome.prevents_default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_disabled_dispatcher_forwards_nothing() {
        let log = Log::default();
        let dispatcher = ShortcutDispatcher::new(recording(&log, Command::all()), AlwaysConfirm)
            .with_enabled(false)
            .attach();

        assert_eq!(dispatcher.handle_key(&ctrl('s')), KeyOutcome::PassThrough);
        assert_eq!(dispatcher.handle_key(&escape()), KeyOutcome::PassThrough);

        dispatcher.set_enabled(true);
        assert_eq!(dispatcher.handle_key(&ctrl('s')).command(), Some(Command::Save));
        assert_eq!(*log.borrow(), vec![Command::Save]);
    }

    #[test]
    fn test_release_events_pass_through() {
        let log = Log::default();
        let dispatcher =
            ShortcutDispatcher::new(recording(&log, Command::all()), AlwaysConfirm).attach();
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );

        assert_eq!(dispatcher.handle_key(&release), KeyOutcome::PassThrough);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_clean_escape_exits_without_prompt() {
        let log = Log::default();
        let asked = Rc::new(Cell::new(0));
        let asked_in = Rc::clone(&asked);
        let dispatcher = ShortcutDispatcher::new(recording(&log, &[Command::Exit]), move |_: &str| {
            asked_in.set(asked_in.get() + 1);
            false
        })
        .attach();

        let outcome = dispatcher.handle_key(&escape());

        assert_eq!(outcome.command(), Some(Command::Exit));
        assert!(!outcome.prevents_default());
        assert_eq!(asked.get(), 0);
        assert_eq!(*log.borrow(), vec![Command::Exit]);
    }

    #[test]
    fn test_dirty_escape_declined_changes_nothing() {
        let log = Log::default();
        let dispatcher =
            ShortcutDispatcher::new(recording(&log, Command::all()), NeverConfirm).attach();
        dispatcher.set_dirty(true);

        assert_eq!(dispatcher.handle_key(&escape()), KeyOutcome::ExitDeclined);

        assert!(log.borrow().is_empty());
        assert!(dispatcher.is_dirty());
        assert!(dispatcher.is_enabled());
        assert_eq!(dispatcher.handle_key(&ctrl('s')).command(), Some(Command::Save));
    }

    #[test]
    fn test_dirty_escape_accepted_exits_once() {
        let log = Log::default();
        let message = Rc::new(RefCell::new(String::new()));
        let message_in = Rc::clone(&message);
        let dispatcher = ShortcutDispatcher::new(recording(&log, Command::all()), move |m: &str| {
            *message_in.borrow_mut() = m.to_string();
            true
        })
        .with_exit_message("Discard your edits?")
        .attach();
        dispatcher.set_dirty(true);

        let outcome = dispatcher.handle_key(&escape());

        assert_eq!(outcome.command(), Some(Command::Exit));
        assert_eq!(*log.borrow(), vec![Command::Exit]);
        assert_eq!(*message.borrow(), "Discard your edits?");
    }

    #[test]
    fn test_dirty_probe_is_read_at_escape() {
        let dirty = Rc::new(Cell::new(false));
        let dirty_in = Rc::clone(&dirty);
        let dispatcher = ShortcutDispatcher::new(ShortcutHandlers::new(), NeverConfirm)
            .with_dirty_probe(move || dirty_in.get())
            .attach();

        assert_eq!(dispatcher.handle_key(&escape()).command(), Some(Command::Exit));
        dirty.set(true);
        assert_eq!(dispatcher.handle_key(&escape()), KeyOutcome::ExitDeclined);
    }

    #[test]
    fn test_escape_during_confirmation_is_ignored() {
        let log = Log::default();
        let slot: Rc<RefCell<Option<Rc<AttachedDispatcher>>>> = Rc::default();
        let nested = Rc::new(Cell::new(None));

        let slot_in = Rc::clone(&slot);
        let nested_in = Rc::clone(&nested);
        let confirm = move |_: &str| {
            let dispatcher = slot_in.borrow().clone();
            if let Some(dispatcher) = dispatcher {
                nested_in.set(Some(dispatcher.handle_key(&escape())));
            }
            true
        };

        let dispatcher = Rc::new(
            ShortcutDispatcher::new(recording(&log, Command::all()), confirm).attach(),
        );
        dispatcher.set_dirty(true);
        *slot.borrow_mut() = Some(Rc::clone(&dispatcher));

        let outcome = dispatcher.handle_key(&escape());
        slot.borrow_mut().take();

        assert_eq!(nested.get(), Some(KeyOutcome::ExitBusy));
        assert_eq!(outcome.command(), Some(Command::Exit));
        assert_eq!(*log.borrow(), vec![Command::Exit]);
    }

    #[test]
    fn test_failing_handler_does_not_break_dispatcher() {
        let log = Log::default();
        let log_in = Rc::clone(&log);
        let handlers = ShortcutHandlers::new()
            .on_save(|| anyhow::bail!("disk full"))
            .on_toggle_publish(|| panic!("publish exploded"))
            .on(Command::Undo, move || {
                log_in.borrow_mut().push(Command::Undo);
                Ok(())
            });
        let dispatcher = ShortcutDispatcher::new(handlers, NeverConfirm).attach();

        assert_eq!(dispatcher.handle_key(&ctrl('s')).command(), Some(Command::Save));
        assert_eq!(
            dispatcher.handle_key(&ctrl('p')).command(),
            Some(Command::TogglePublish)
        );
        assert_eq!(dispatcher.handle_key(&ctrl('z')).command(), Some(Command::Undo));
        assert_eq!(*log.borrow(), vec![Command::Undo]);
    }

    #[test]
    fn test_attach_and_detach_track_registration() {
        let dispatcher = ShortcutDispatcher::new(ShortcutHandlers::new(), NeverConfirm);
        assert!(!dispatcher.is_attached());

        let attached = dispatcher.attach();
        assert!(attached.is_attached());
        assert!(attached_dispatchers() >= 1);

        let dispatcher = attached.detach();
        assert!(!dispatcher.is_attached());

        let attached = dispatcher.attach();
        assert!(attached.is_attached());
        assert_eq!(attached.handle_key(&ctrl('p')).command(), Some(Command::TogglePublish));
    }

    #[test]
    fn test_drop_releases_registration() {
        let attached = ShortcutDispatcher::new(ShortcutHandlers::new(), NeverConfirm).attach();
        let flag = Rc::clone(&attached.attached);
        assert!(flag.get());

        drop(attached);
        assert!(!flag.get());
    }

    #[test]
    fn test_panic_while_attached_releases_registration() {
        let dispatcher = ShortcutDispatcher::new(ShortcutHandlers::new(), NeverConfirm);
        let flag = Rc::clone(&dispatcher.attached);
        let seen_attached = Rc::new(Cell::new(false));
        let seen_in = Rc::clone(&seen_attached);

        let result = panic::catch_unwind(AssertUnwindSafe(move || {
            let attached = dispatcher.attach();
            seen_in.set(attached.is_attached());
            panic!("editor crashed while attached");
        }));

        assert!(result.is_err());
        assert!(seen_attached.get());
        assert!(!flag.get());
    }
}
