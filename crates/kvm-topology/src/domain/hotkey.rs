//! Hotkey actions.
//!
//! A hotkey binds a key chord to an action the engine performs when the chord
//! is pressed, released, or both.  Actions can name screens (the target of
//! `SwitchToScreen`, or the screens an action is scoped to), so the
//! configuration aggregate rewrites or drops them when screens are renamed or
//! removed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::Direction;

/// Characters a key name may not contain because the grammar uses them.
const RESERVED_KEY_CHARS: &[char] = &['(', ')', ',', ';', '=', '#', ':', '+'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("invalid key chord \"{0}\"")]
    InvalidChord(String),
}

/// A `+`-joined list of key names, e.g. `Control+Alt+Left`.
///
/// Key names are opaque here; mapping them to platform key codes is the
/// engine's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyChord(String);

impl KeyChord {
    /// Validates and wraps a chord string.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::InvalidChord`] if any `+`-separated key is
    /// empty or contains whitespace or a reserved character.
    pub fn parse(chord: &str) -> Result<KeyChord, HotkeyError> {
        let valid = chord.split('+').all(|key| {
            !key.is_empty()
                && !key
                    .chars()
                    .any(|c| c.is_whitespace() || RESERVED_KEY_CHARS.contains(&c))
        });
        if !valid {
            return Err(HotkeyError::InvalidChord(chord.to_string()));
        }
        Ok(KeyChord(chord.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.split('+')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for KeyChord {
    type Error = HotkeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        KeyChord::parse(&value)
    }
}

impl From<KeyChord> for String {
    fn from(chord: KeyChord) -> Self {
        chord.0
    }
}

/// What "lock cursor to screen" does when triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockMode {
    Toggle,
    On,
    Off,
}

impl LockMode {
    pub fn keyword(self) -> &'static str {
        match self {
            LockMode::Toggle => "toggle",
            LockMode::On => "on",
            LockMode::Off => "off",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<LockMode> {
        match keyword {
            "toggle" => Some(LockMode::Toggle),
            "on" => Some(LockMode::On),
            "off" => Some(LockMode::Off),
            _ => None,
        }
    }
}

/// The command a hotkey runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Move focus to the named screen.
    SwitchToScreen { screen: String },
    /// Move focus to the neighbor in a direction.
    SwitchInDirection { direction: Direction },
    /// Confine the cursor to the current screen.
    LockCursorToScreen { mode: LockMode },
    /// Ask the engine to restart the server.
    RestartServer,
}

/// When the action fires relative to the chord.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    #[default]
    OnPress,
    OnRelease,
    Both,
}

impl Trigger {
    pub fn fires_on_press(self) -> bool {
        matches!(self, Trigger::OnPress | Trigger::Both)
    }

    pub fn fires_on_release(self) -> bool {
        matches!(self, Trigger::OnRelease | Trigger::Both)
    }
}

/// Outcome of removing a screen name from a hotkey action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRemoval {
    /// The action did not mention the screen.
    Unaffected,
    /// The screen was dropped from a multi-screen scope; the action stays.
    Trimmed,
    /// The action only made sense for that screen and must be discarded.
    Invalidated,
}

/// A key chord bound to one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyAction {
    pub chord: KeyChord,
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(default)]
    pub trigger: Trigger,
    /// Screens the action is restricted to.  Empty means every screen.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
}

impl HotkeyAction {
    /// Creates an action that fires on press and applies to every screen.
    pub fn new(chord: KeyChord, kind: ActionKind) -> Self {
        Self {
            chord,
            kind,
            trigger: Trigger::OnPress,
            scope: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_scope<I, S>(mut self, screens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = screens.into_iter().map(Into::into).collect();
        self
    }

    /// Every screen name the action refers to (switch target and scope).
    pub fn referenced_screens(&self) -> impl Iterator<Item = &str> {
        let target = match &self.kind {
            ActionKind::SwitchToScreen { screen } => Some(screen.as_str()),
            _ => None,
        };
        target.into_iter().chain(self.scope.iter().map(String::as_str))
    }

    /// Rewrites every reference to `old` so it points at `new`.
    pub fn rename_screen(&mut self, old: &str, new: &str) {
        if let ActionKind::SwitchToScreen { screen } = &mut self.kind {
            if screen == old {
                *screen = new.to_string();
            }
        }
        for name in self.scope.iter_mut().filter(|n| n.as_str() == old) {
            *name = new.to_string();
        }
    }

    /// Drops `name` from the action.
    ///
    /// A switch targeting `name`, or a scope consisting of `name` alone,
    /// invalidates the action.  A scope listing other screens too just loses
    /// that entry.
    pub fn forget_screen(&mut self, name: &str) -> ScreenRemoval {
        if matches!(&self.kind, ActionKind::SwitchToScreen { screen } if screen == name) {
            return ScreenRemoval::Invalidated;
        }
        if !self.scope.iter().any(|n| n == name) {
            return ScreenRemoval::Unaffected;
        }
        if self.scope.iter().all(|n| n == name) {
            return ScreenRemoval::Invalidated;
        }
        self.scope.retain(|n| n != name);
        ScreenRemoval::Trimmed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
