//! Keyboard shortcuts for a form editor.
//!
//! This crate maps modifier chords to editor commands:
//! - A fixed, ordered binding table where the first match wins
//! - Ctrl and Cmd/Super treated as one modifier
//! - Confirmation before exiting with unsaved changes
//! - Scoped attachment: dropping the [`AttachedDispatcher`] releases it
//!
//! # Example
//!
//! ```
//! use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
//! use draftkeep_shortcut::{Command, KeyOutcome, NeverConfirm, ShortcutDispatcher, ShortcutHandlers};
//!
//! let handlers = ShortcutHandlers::new().on_save(|| {
//!     println!("saving");
//!     Ok(())
//! });
//! let dispatcher = ShortcutDispatcher::new(handlers, NeverConfirm).attach();
//!
//! let outcome = dispatcher.handle_key(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
//! assert_eq!(outcome.command(), Some(Command::Save));
//! assert!(outcome.prevents_default());
//! ```

pub mod binding;
mod confirm;
mod dispatcher;
mod handlers;

pub use binding::{bindings, resolve, Chord, Command, KeyName, ShiftRule, ShortcutBinding};
pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm};
pub use dispatcher::{
    attached_dispatchers, AttachedDispatcher, KeyOutcome, ShortcutDispatcher,
    DEFAULT_EXIT_CONFIRM_MESSAGE,
};
pub use handlers::{CommandHandler, ShortcutHandlers};
