//! Keyboard shortcuts.
//!
//! Shortcuts are written the way menus display them, e.g. `"Ctrl+Z"` or
//! `"Ctrl+Shift+S"`. Matching ignores letter case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeymapError {
    #[error("Invalid shortcut: {0:?}")]
    InvalidShortcut(String),

    #[error("Unknown modifier {modifier:?} in {shortcut:?}")]
    UnknownModifier { modifier: String, shortcut: String },
}

/// Something a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Ask the control surface for a file to load
    Open,
    /// Ask the control surface for a path to save to
    Save,
    Undo,
    Redo,
    CropTool,
    MaskTool,
    Rotate,
    Flip,
}

/// A key plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Lowercased key character
    pub key: char,
}

impl Shortcut {
    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            shift: false,
            alt: false,
            key: key.to_ascii_lowercase(),
        }
    }

    /// Build from a key event. `key` is the event's key string; anything
    /// longer than one character (e.g. `"Shift"`, `"Enter"`) yields `None`.
    pub fn from_event(key: &str, ctrl: bool, shift: bool, alt: bool) -> Option<Self> {
        let mut chars = key.chars();
        let first = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self {
            ctrl,
            shift,
            alt,
            key: first.to_ascii_lowercase(),
        })
    }
}

impl FromStr for Shortcut {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts
            .pop()
            .filter(|k| k.chars().count() == 1)
            .and_then(|k| k.chars().next())
            .ok_or_else(|| KeymapError::InvalidShortcut(s.to_string()))?;

        let mut shortcut = Shortcut {
            ctrl: false,
            shift: false,
            alt: false,
            key: key.to_ascii_lowercase(),
        };
        for modifier in parts {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" => shortcut.ctrl = true,
                "shift" => shortcut.shift = true,
                "alt" => shortcut.alt = true,
                _ => {
                    return Err(KeymapError::UnknownModifier {
                        modifier: modifier.to_string(),
                        shortcut: s.to_string(),
                    })
                }
            }
        }
        Ok(shortcut)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

/// Shortcut bindings. Later bindings for the same shortcut replace earlier ones.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(Shortcut, Action)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            bindings: vec![
                (Shortcut::ctrl('o'), Action::Open),
                (Shortcut::ctrl('s'), Action::Save),
                (Shortcut::ctrl('z'), Action::Undo),
                (Shortcut::ctrl('y'), Action::Redo),
                (Shortcut::ctrl('x'), Action::CropTool),
                (Shortcut::ctrl('m'), Action::MaskTool),
                (Shortcut::ctrl('r'), Action::Rotate),
                (Shortcut::ctrl('f'), Action::Flip),
            ],
        }
    }
}

impl Keymap {
    /// A keymap with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn bind(&mut self, shortcut: Shortcut, action: Action) {
        self.bindings.retain(|(s, _)| *s != shortcut);
        self.bindings.push((shortcut, action));
    }

    /// Parse `shortcut` and bind it.
    pub fn bind_str(&mut self, shortcut: &str, action: Action) -> Result<(), KeymapError> {
        self.bind(shortcut.parse()?, action);
        Ok(())
    }

    pub fn lookup(&self, shortcut: &Shortcut) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(s, _)| s == shortcut)
            .map(|&(_, action)| action)
    }
}
