//! Server-wide options.
//!
//! Timings that can be switched off entirely are `Option<u32>` (milliseconds):
//! `None` means the option is not written to the engine configuration at all.

use serde::{Deserialize, Serialize};

use super::screen::DeadCorners;

/// Interval suggested by the editor when switch delay or double tap is enabled.
pub const DEFAULT_SWITCH_INTERVAL_MS: u32 = 250;

/// Interval suggested by the editor when the client check is enabled.
pub const DEFAULT_HEARTBEAT_MS: u32 = 5000;

/// Default clipboard transfer limit, in KiB (3 MiB).
pub const DEFAULT_CLIPBOARD_SHARING_SIZE_KIB: u32 = 3 * 1024;

/// Options that apply to the whole server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalOptions {
    /// Share the clipboard between screens.
    #[serde(default = "default_true")]
    pub clipboard_sharing: bool,
    /// Largest clipboard content, in KiB, that is shared.
    #[serde(default = "default_clipboard_sharing_size_kib")]
    pub clipboard_sharing_size_kib: u32,
    /// Allow files to be dragged between screens.
    #[serde(default = "default_true")]
    pub drag_and_drop: bool,
    /// Largest file, in MiB, that drag and drop will transfer.
    #[serde(default = "default_drag_drop_max_mib")]
    pub drag_drop_max_mib: u32,
    /// Send relative mouse movements instead of absolute positions.
    #[serde(default)]
    pub relative_mouse_moves: bool,
    /// Keep the server's foreground window from losing focus (Windows only).
    #[serde(default)]
    pub win32_keep_foreground: bool,
    /// Start and stop screensavers on all screens together.
    #[serde(default = "default_true")]
    pub screensaver_sync: bool,
    /// Ignore the scroll-lock key as a "lock cursor to screen" toggle.
    #[serde(default)]
    pub disable_lock_to_screen: bool,
    /// Switch only when the edge is hit twice within this many milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_double_tap_ms: Option<u32>,
    /// Switch only after the cursor rests at the edge this many milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_delay_ms: Option<u32>,
    /// Check clients every this many milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_ms: Option<u32>,
    /// Network protocol dialect (`synergy` or `barrier`).  Kept verbatim; the
    /// editor does not interpret it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Client the server connects to when the connection is inverted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    /// Do not offer to place clients announced by auto-configuration.
    #[serde(default)]
    pub ignore_auto_config_clients: bool,
    /// Dead corners applied to every screen.
    #[serde(default)]
    pub dead_corners: DeadCorners,
}

fn default_true() -> bool {
    true
}

fn default_drag_drop_max_mib() -> u32 {
    100
}

fn default_clipboard_sharing_size_kib() -> u32 {
    DEFAULT_CLIPBOARD_SHARING_SIZE_KIB
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            clipboard_sharing: true,
            clipboard_sharing_size_kib: DEFAULT_CLIPBOARD_SHARING_SIZE_KIB,
            drag_and_drop: true,
            drag_drop_max_mib: default_drag_drop_max_mib(),
            relative_mouse_moves: false,
            win32_keep_foreground: false,
            screensaver_sync: true,
            disable_lock_to_screen: false,
            switch_double_tap_ms: None,
            switch_delay_ms: None,
            heartbeat_ms: None,
            protocol: None,
            client_address: None,
            ignore_auto_config_clients: false,
            dead_corners: DeadCorners::default(),
        }
    }
}
