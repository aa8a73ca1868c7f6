//! Screen entities and their per-screen settings.
//!
//! A [`Screen`] is one participating display endpoint: the server itself or a
//! client machine.  Besides its name and grid cell it carries the settings the
//! engine applies when input is redirected onto it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grid::Cell;

/// Characters that would break the engine grammar if used in a name.
const RESERVED_NAME_CHARS: &[char] = &[':', '=', ',', ';', '(', ')', '#', '+', '*'];

/// Grammar keywords.  An alias line reading `end` would close its section.
const RESERVED_NAMES: &[&str] = &["end", "section"];

/// Opaque identifier issued by the registry when a screen is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(Uuid);

impl ScreenId {
    pub(crate) fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns `true` if `name` can be used as a screen name or alias.
///
/// Names are case-sensitive and must be non-empty, free of whitespace and free
/// of the characters the configuration grammar reserves.  The grammar keywords
/// `end` and `section` are not names.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !RESERVED_NAMES.contains(&name)
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || RESERVED_NAME_CHARS.contains(&c))
}

/// A screen placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub id: ScreenId,
    pub name: String,
    pub cell: Cell,
    pub settings: ScreenSettings,
}

/// Everything about a screen other than its identity and placement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSettings {
    /// Alternative names the engine accepts for this screen, in user order.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub modifiers: ModifierRemap,
    #[serde(default)]
    pub dead_corners: DeadCorners,
    #[serde(default)]
    pub fixes: ScreenFixes,
}

/// A modifier key a source modifier can be remapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    AltGr,
    Meta,
    Super,
    /// The modifier is swallowed on this screen.
    None,
}

impl ModifierKey {
    pub fn keyword(self) -> &'static str {
        match self {
            ModifierKey::Shift => "shift",
            ModifierKey::Ctrl => "ctrl",
            ModifierKey::Alt => "alt",
            ModifierKey::AltGr => "altgr",
            ModifierKey::Meta => "meta",
            ModifierKey::Super => "super",
            ModifierKey::None => "none",
        }
    }

    /// Parses a modifier keyword, ignoring ASCII case like the engine does.
    pub fn from_keyword(keyword: &str) -> Option<ModifierKey> {
        [
            ModifierKey::Shift,
            ModifierKey::Ctrl,
            ModifierKey::Alt,
            ModifierKey::AltGr,
            ModifierKey::Meta,
            ModifierKey::Super,
            ModifierKey::None,
        ]
        .into_iter()
        .find(|key| key.keyword().eq_ignore_ascii_case(keyword))
    }
}

/// Where each source modifier is delivered on a screen.  Defaults to identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierRemap {
    pub shift: ModifierKey,
    pub ctrl: ModifierKey,
    pub alt: ModifierKey,
    pub meta: ModifierKey,
    #[serde(rename = "super")]
    pub super_key: ModifierKey,
}

impl Default for ModifierRemap {
    fn default() -> Self {
        Self {
            shift: ModifierKey::Shift,
            ctrl: ModifierKey::Ctrl,
            alt: ModifierKey::Alt,
            meta: ModifierKey::Meta,
            super_key: ModifierKey::Super,
        }
    }
}

impl ModifierRemap {
    /// Source keywords in the order the engine configuration lists them.
    pub const SOURCES: [&'static str; 5] = ["shift", "ctrl", "alt", "meta", "super"];

    /// Returns `(source keyword, target)` pairs in [`ModifierRemap::SOURCES`] order.
    pub fn entries(&self) -> [(&'static str, ModifierKey); 5] {
        [
            ("shift", self.shift),
            ("ctrl", self.ctrl),
            ("alt", self.alt),
            ("meta", self.meta),
            ("super", self.super_key),
        ]
    }

    /// Sets the target for the source modifier named `source`.
    ///
    /// Returns `false` if `source` is not one of [`ModifierRemap::SOURCES`].
    pub fn set(&mut self, source: &str, target: ModifierKey) -> bool {
        let slot = match source {
            "shift" => &mut self.shift,
            "ctrl" => &mut self.ctrl,
            "alt" => &mut self.alt,
            "meta" => &mut self.meta,
            "super" => &mut self.super_key,
            _ => return false,
        };
        *slot = target;
        true
    }
}

/// One of the four physical screen corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }
}

/// Corners in which edge switching is suppressed, plus their size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadCorners {
    #[serde(default)]
    pub top_left: bool,
    #[serde(default)]
    pub top_right: bool,
    #[serde(default)]
    pub bottom_left: bool,
    #[serde(default)]
    pub bottom_right: bool,
    #[serde(default)]
    pub size: u32,
}

impl DeadCorners {
    pub fn is_set(&self, corner: Corner) -> bool {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    pub fn set(&mut self, corner: Corner, enabled: bool) {
        match corner {
            Corner::TopLeft => self.top_left = enabled,
            Corner::TopRight => self.top_right = enabled,
            Corner::BottomLeft => self.bottom_left = enabled,
            Corner::BottomRight => self.bottom_right = enabled,
        }
    }

    /// Returns the enabled corners in [`Corner::ALL`] order.
    pub fn enabled(&self) -> impl Iterator<Item = Corner> + '_ {
        Corner::ALL.into_iter().filter(|c| self.is_set(*c))
    }
}

/// Platform-specific input quirks the engine can work around per screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenFixes {
    #[serde(default)]
    pub half_duplex_caps_lock: bool,
    #[serde(default)]
    pub half_duplex_num_lock: bool,
    #[serde(default)]
    pub half_duplex_scroll_lock: bool,
    #[serde(default)]
    pub xtest_xinerama_unaware: bool,
}

impl ScreenFixes {
    /// Returns `(engine keyword, value)` pairs in the order the engine lists them.
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            ("halfDuplexCapsLock", self.half_duplex_caps_lock),
            ("halfDuplexNumLock", self.half_duplex_num_lock),
            ("halfDuplexScrollLock", self.half_duplex_scroll_lock),
            ("xtestIsXineramaUnaware", self.xtest_xinerama_unaware),
        ]
    }

    /// Sets the flag named by its engine keyword.  Returns `false` for unknown keywords.
    pub fn set(&mut self, keyword: &str, value: bool) -> bool {
        let slot = match keyword {
            "halfDuplexCapsLock" => &mut self.half_duplex_caps_lock,
            "halfDuplexNumLock" => &mut self.half_duplex_num_lock,
            "halfDuplexScrollLock" => &mut self.half_duplex_scroll_lock,
            "xtestIsXineramaUnaware" => &mut self.xtest_xinerama_unaware,
            _ => return false,
        };
        *slot = value;
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
