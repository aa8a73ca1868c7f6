//! Writes a [`ServerConfig`] in the engine grammar.

use tracing::debug;

use super::{Document, ExportError, CELL_DIRECTIVE, IGNORE_AUTO_CONFIG_DIRECTIVE};
use crate::domain::config::ServerConfig;
use crate::domain::grid::Direction;
use crate::domain::hotkey::{ActionKind, HotkeyAction, Trigger};
use crate::domain::options::GlobalOptions;
use crate::domain::screen::{DeadCorners, Screen};

/// Serializes `config` into a [`Document`].
///
/// Screens are written in row-major order of their cells, links in
/// right/left/up/down order per screen.
///
/// # Errors
///
/// - [`ExportError::NoScreens`] if the registry is empty.
/// - [`ExportError::Disconnected`] if two or more screens are placed and some
///   of them cannot be reached from the others.
pub fn export(config: &ServerConfig) -> Result<Document, ExportError> {
    let registry = config.registry();
    if registry.is_empty() {
        return Err(ExportError::NoScreens);
    }
    let topology = config.topology();
    if !topology.is_connected() {
        return Err(ExportError::Disconnected {
            components: topology.components().len(),
        });
    }

    let screens = registry.iter_ordered();
    let mut out = Emitter::default();

    out.line(0, "section: screens");
    for screen in &screens {
        write_screen(&mut out, screen);
    }
    out.line(0, "end");

    if screens.iter().any(|s| !s.settings.aliases.is_empty()) {
        out.blank();
        out.line(0, "section: aliases");
        for screen in screens.iter().filter(|s| !s.settings.aliases.is_empty()) {
            out.line(1, format!("{}:", screen.name));
            for alias in &screen.settings.aliases {
                out.line(2, alias);
            }
        }
        out.line(0, "end");
    }

    out.blank();
    out.line(0, "section: links");
    for screen in &screens {
        let neighbors = topology.neighbors(screen.id);
        if neighbors.iter().all(Option::is_none) {
            continue;
        }
        out.line(1, format!("{}:", screen.name));
        for (direction, neighbor) in Direction::ALL.into_iter().zip(neighbors) {
            if let Some(name) = neighbor.and_then(|id| registry.get(id)).map(|s| &s.name) {
                out.line(2, format!("{} = {}", direction.keyword(), name));
            }
        }
    }
    out.line(0, "end");

    out.blank();
    out.line(0, "section: options");
    write_options(&mut out, &config.options);
    for action in config.hotkeys() {
        out.line(1, keystroke_text(action));
    }
    out.line(0, "end");

    debug!(
        screens = screens.len(),
        hotkeys = config.hotkeys().len(),
        "configuration exported"
    );
    Ok(Document(out.text))
}

fn write_screen(out: &mut Emitter, screen: &Screen) {
    let settings = &screen.settings;
    out.line(1, format!("{}:", screen.name));
    out.line(
        2,
        format!("#@{} {},{}", CELL_DIRECTIVE, screen.cell.column, screen.cell.row),
    );
    for (source, target) in settings.modifiers.entries() {
        out.line(2, format!("{} = {}", source, target.keyword()));
    }
    for (keyword, enabled) in settings.fixes.entries() {
        out.line(2, format!("{} = {}", keyword, enabled));
    }
    write_corners(out, 2, &settings.dead_corners);
}

fn write_options(out: &mut Emitter, options: &GlobalOptions) {
    if let Some(ms) = options.heartbeat_ms {
        out.line(1, format!("heartbeat = {ms}"));
    }
    if let Some(protocol) = &options.protocol {
        out.line(1, format!("protocol = {protocol}"));
    }
    out.line(1, format!("relativeMouseMoves = {}", options.relative_mouse_moves));
    out.line(1, format!("screenSaverSync = {}", options.screensaver_sync));
    out.line(1, format!("win32KeepForeground = {}", options.win32_keep_foreground));
    out.line(1, format!("disableLockToScreen = {}", options.disable_lock_to_screen));
    out.line(1, format!("clipboardSharing = {}", options.clipboard_sharing));
    out.line(1, format!("clipboardSharingSize = {}", options.clipboard_sharing_size_kib));
    if let Some(address) = &options.client_address {
        out.line(1, format!("clientAddress = {address}"));
    }
    out.line(1, format!("enableDragDrop = {}", options.drag_and_drop));
    out.line(1, format!("dragDropMaxSize = {}", options.drag_drop_max_mib));
    if let Some(ms) = options.switch_delay_ms {
        out.line(1, format!("switchDelay = {ms}"));
    }
    if let Some(ms) = options.switch_double_tap_ms {
        out.line(1, format!("switchDoubleTap = {ms}"));
    }
    write_corners(out, 1, &options.dead_corners);
    out.line(
        1,
        format!(
            "#@{} = {}",
            IGNORE_AUTO_CONFIG_DIRECTIVE, options.ignore_auto_config_clients
        ),
    );
}

fn write_corners(out: &mut Emitter, depth: usize, corners: &DeadCorners) {
    let mut text = String::from("switchCorners = none");
    for corner in corners.enabled() {
        text.push_str(" +");
        text.push_str(corner.keyword());
    }
    out.line(depth, text);
    out.line(depth, format!("switchCornerSize = {}", corners.size));
}

/// `keystroke(<chord>) = <press actions> [; <release actions>]`
fn keystroke_text(action: &HotkeyAction) -> String {
    let command = action_text(action);
    let actions = match action.trigger {
        Trigger::OnPress => command,
        Trigger::OnRelease => format!("; {command}"),
        Trigger::Both => format!("{command} ; {command}"),
    };
    format!("keystroke({}) = {}", action.chord, actions)
}

pub(super) fn action_text(action: &HotkeyAction) -> String {
    let (name, argument) = match &action.kind {
        ActionKind::SwitchToScreen { screen } => ("switchToScreen", screen.as_str()),
        ActionKind::SwitchInDirection { direction } => ("switchInDirection", direction.keyword()),
        ActionKind::LockCursorToScreen { mode } => ("lockCursorToScreen", mode.keyword()),
        ActionKind::RestartServer => ("restartServer", "restart"),
    };
    if action.scope.is_empty() {
        format!("{name}({argument})")
    } else {
        format!("{name}({argument},{})", action.scope.join(":"))
    }
}

/// Accumulates tab-indented lines.
#[derive(Default)]
struct Emitter {
    text: String,
}

impl Emitter {
    fn line(&mut self, depth: usize, content: impl AsRef<str>) {
        for _ in 0..depth {
            self.text.push('\t');
        }
        self.text.push_str(content.as_ref());
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
