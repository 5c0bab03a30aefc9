//! Static shortcut bindings.
//!
//! Bindings are checked in table order and the first match wins:
//!
//! | chord                 | command        |
//! |-----------------------|----------------|
//! | `ctrl+shift+s`        | save and exit  |
//! | `ctrl+s`              | save           |
//! | `ctrl+p`              | toggle publish |
//! | `ctrl+enter`          | save           |
//! | `ctrl+shift+z`        | redo           |
//! | `ctrl+z`              | undo           |
//! | `ctrl+y`              | redo           |
//! | `escape`              | exit           |
//!
//! `ctrl` also matches the Cmd/Super and Meta modifiers.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An editor command a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Save,
    SaveAndExit,
    TogglePublish,
    Undo,
    Redo,
    Exit,
}

impl Command {
    /// Get all commands.
    pub fn all() -> &'static [Command] {
        use Command::*;
        &[Save, SaveAndExit, TogglePublish, Undo, Redo, Exit]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Save => "save",
            Command::SaveAndExit => "save_and_exit",
            Command::TogglePublish => "toggle_publish",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Exit => "exit",
        }
    }

    /// Get a human-readable description of this command.
    pub fn description(&self) -> &'static str {
        match self {
            Command::Save => "Save changes",
            Command::SaveAndExit => "Save changes and close the editor",
            Command::TogglePublish => "Toggle published state",
            Command::Undo => "Undo last change",
            Command::Redo => "Redo undone change",
            Command::Exit => "Close the editor",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The base key of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyName {
    /// A character key, stored lowercase and compared case-insensitively.
    Char(char),
    Enter,
    Escape,
}

impl KeyName {
    fn matches(&self, code: &KeyCode) -> bool {
        match (self, code) {
            (KeyName::Char(expected), KeyCode::Char(c)) => c.eq_ignore_ascii_case(expected),
            (KeyName::Enter, KeyCode::Enter) => true,
            (KeyName::Escape, KeyCode::Esc) => true,
            _ => false,
        }
    }

    fn to_display(self) -> String {
        match self {
            KeyName::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyName::Enter => "Enter".to_string(),
            KeyName::Escape => "Esc".to_string(),
        }
    }
}

/// How a chord treats the shift key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftRule {
    Required,
    Forbidden,
    Any,
}

/// A modifier combination plus a base key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    /// Ctrl (or Cmd/Super/Meta) must be held. When false, modifiers are not checked.
    pub ctrl_or_cmd: bool,
    pub shift: ShiftRule,
    pub key: KeyName,
}

impl Chord {
    /// Label used for the ctrl-or-cmd modifier in help text.
    pub const PRIMARY_MODIFIER_LABEL: &'static str = if cfg!(target_os = "macos") {
        "Cmd"
    } else {
        "Ctrl"
    };

    /// A ctrl-or-cmd chord that ignores shift.
    pub const fn ctrl(key: KeyName) -> Self {
        Self {
            ctrl_or_cmd: true,
            shift: ShiftRule::Any,
            key,
        }
    }

    /// A bare key with no modifier requirements.
    pub const fn key(key: KeyName) -> Self {
        Self {
            ctrl_or_cmd: false,
            shift: ShiftRule::Any,
            key,
        }
    }

    /// Set the shift rule.
    pub const fn with_shift(mut self, shift: ShiftRule) -> Self {
        self.shift = shift;
        self
    }

    /// Check if this chord matches a key event.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.ctrl_or_cmd && !is_ctrl_or_cmd(event.modifiers) {
            return false;
        }

        let shift_held = event.modifiers.contains(KeyModifiers::SHIFT);
        let shift_ok = match self.shift {
            ShiftRule::Required => shift_held,
            ShiftRule::Forbidden => !shift_held,
            ShiftRule::Any => true,
        };

        shift_ok && self.key.matches(&event.code)
    }

    /// Convert to display string, e.g. `Ctrl+Shift+S`.
    pub fn to_display(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl_or_cmd {
            parts.push(Self::PRIMARY_MODIFIER_LABEL.to_string());
        }
        if self.shift == ShiftRule::Required {
            parts.push("Shift".to_string());
        }
        parts.push(self.key.to_display());
        parts.join("+")
    }
}

fn is_ctrl_or_cmd(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META)
}

/// A chord bound to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutBinding {
    pub chord: Chord,
    pub command: Command,
}

impl ShortcutBinding {
    const fn new(chord: Chord, command: Command) -> Self {
        Self { chord, command }
    }

    /// Whether a match should suppress the host's default handling.
    ///
    /// Every modifier chord does, so `ctrl+p` never opens a print dialog
    /// and `ctrl+s` never opens a save-page dialog.
    pub fn prevents_default(&self) -> bool {
        self.chord.ctrl_or_cmd
    }
}

static BINDINGS: &[ShortcutBinding] = &[
    ShortcutBinding::new(
        Chord::ctrl(KeyName::Char('s')).with_shift(ShiftRule::Required),
        Command::SaveAndExit,
    ),
    ShortcutBinding::new(
        Chord::ctrl(KeyName::Char('s')).with_shift(ShiftRule::Forbidden),
        Command::Save,
    ),
    ShortcutBinding::new(Chord::ctrl(KeyName::Char('p')), Command::TogglePublish),
    ShortcutBinding::new(Chord::ctrl(KeyName::Enter), Command::Save),
    ShortcutBinding::new(
        Chord::ctrl(KeyName::Char('z')).with_shift(ShiftRule::Required),
        Command::Redo,
    ),
    ShortcutBinding::new(
        Chord::ctrl(KeyName::Char('z')).with_shift(ShiftRule::Forbidden),
        Command::Undo,
    ),
    ShortcutBinding::new(Chord::ctrl(KeyName::Char('y')), Command::Redo),
    ShortcutBinding::new(Chord::key(KeyName::Escape), Command::Exit),
];

/// All active bindings, in resolution order.
pub fn bindings() -> &'static [ShortcutBinding] {
    BINDINGS
}

/// Find the binding for a key event. The first matching entry wins.
pub fn resolve(event: &KeyEvent) -> Option<&'static ShortcutBinding> {
    BINDINGS.iter().find(|binding| binding.chord.matches(event))
}
