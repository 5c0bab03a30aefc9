//! Command handler registry.

use crate::Command;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// A caller-supplied command handler.
///
/// Errors are logged by the dispatcher and go no further.
pub type CommandHandler = Box<dyn FnMut() -> anyhow::Result<()>>;

/// At most one handler per command. Unregistered commands are silent no-ops.
#[derive(Default)]
pub struct ShortcutHandlers {
    handlers: HashMap<Command, RefCell<CommandHandler>>,
}

impl ShortcutHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `command`, replacing any previous one.
    pub fn on<F>(mut self, command: Command, handler: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.handlers
            .insert(command, RefCell::new(Box::new(handler)));
        self
    }

    pub fn on_save<F>(self, handler: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.on(Command::Save, handler)
    }

    pub fn on_save_and_exit<F>(self, handler: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.on(Command::SaveAndExit, handler)
    }

    pub fn on_toggle_publish<F>(self, handler: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.on(Command::TogglePublish, handler)
    }

    pub fn on_exit<F>(self, handler: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.on(Command::Exit, handler)
    }

    /// Check if a handler is registered for `command`.
    pub fn is_registered(&self, command: Command) -> bool {
        self.handlers.contains_key(&command)
    }

    pub(crate) fn get(&self, command: Command) -> Option<&RefCell<CommandHandler>> {
        self.handlers.get(&command)
    }
}

impl fmt::Debug for ShortcutHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<Command> = self.handlers.keys().copied().collect();
        registered.sort_by_key(|c| c.as_str());
        f.debug_struct("ShortcutHandlers")
            .field("registered", &registered)
            .finish()
    }
}
