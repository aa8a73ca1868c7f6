//! TOML-based settings persistence for the configurator.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\KVMConfigurator\config.toml`
//! - Linux:    `~/.config/kvmconfigurator/config.toml`
//! - macOS:    `~/Library/Application Support/KVMConfigurator/config.toml`
//!
//! The settings file holds the editor's own state: the screen layout, hotkeys
//! and options being edited, plus where the engine configuration is exported.
//! The engine configuration itself is a different file in the engine's
//! grammar (see `engine_file`).
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  It looks similar to INI files but with more
//! data types.  Example:
//!
//! ```toml
//! [app]
//! log_level = "info"
//! server_name = "desk"
//!
//! [[screens]]
//! name = "desk"
//! column = 2
//! row = 1
//! ```
//!
//! The `serde` library provides automatic serialisation/deserialisation between
//! Rust structs and TOML text.  The `#[derive(Serialize, Deserialize)]` macros
//! generate all the boilerplate code at compile time.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This allows
//! the app to work correctly on first run (before a config file exists) and
//! when upgrading from an older config file that is missing newer fields.

use std::path::{Path, PathBuf};

use kvm_topology::{
    Cell, DeadCorners, GlobalOptions, GridViewport, HotkeyAction, ModifierRemap, RegistryError,
    ScreenFixes, ScreenSettings, ServerConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A stored screen or hotkey does not fit the rest of the layout
    /// (duplicate name, two screens on one cell, hotkey naming a missing
    /// screen).
    #[error("invalid layout entry {item}: {source}")]
    Layout {
        item: String,
        #[source]
        source: RegistryError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub options: GlobalOptions,
    #[serde(default)]
    pub screens: Vec<ScreenEntry>,
    #[serde(default)]
    pub hotkeys: Vec<HotkeyAction>,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSection {
    /// Schema version string – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where `export` writes the engine configuration.  When unset the file
    /// goes next to this settings file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_config_path: Option<PathBuf>,
    /// Name of the screen the keyboard and mouse are attached to.
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

/// Size of the grid window shown by the editor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSection {
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
}

/// One placed screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenEntry {
    pub name: String,
    pub column: i32,
    pub row: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub modifiers: ModifierRemap,
    #[serde(default)]
    pub dead_corners: DeadCorners,
    #[serde(default)]
    pub fixes: ScreenFixes,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_server_name() -> String {
    "server".to_string()
}
fn default_columns() -> u32 {
    kvm_topology::domain::grid::DEFAULT_COLUMNS
}
fn default_rows() -> u32 {
    kvm_topology::domain::grid::DEFAULT_ROWS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            grid: GridSection::default(),
            options: GlobalOptions::default(),
            screens: Vec::new(),
            hotkeys: Vec::new(),
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
            engine_config_path: None,
            server_name: default_server_name(),
        }
    }
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            rows: default_rows(),
        }
    }
}

// ── Conversion to and from the domain ─────────────────────────────────────────

impl AppConfig {
    /// Rebuilds the layout stored in this file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Layout`] if an entry is rejected by the
    /// registry, e.g. after the file was edited by hand.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = ServerConfig::new();
        config.options = self.options.clone();

        for entry in &self.screens {
            let settings = ScreenSettings {
                aliases: entry.aliases.clone(),
                modifiers: entry.modifiers,
                dead_corners: entry.dead_corners,
                fixes: entry.fixes,
            };
            config
                .insert_screen(entry.name.clone(), Cell::new(entry.column, entry.row), settings)
                .map_err(|source| ConfigError::Layout {
                    item: format!("screen \"{}\"", entry.name),
                    source,
                })?;
        }
        for action in &self.hotkeys {
            config
                .add_hotkey(action.clone())
                .map_err(|source| ConfigError::Layout {
                    item: format!("hotkey {}", action.chord),
                    source,
                })?;
        }
        Ok(config)
    }

    /// Replaces the stored layout with `config`.  Screens are stored in
    /// row-major order so the file diffs cleanly.
    pub fn store_server_config(&mut self, config: &ServerConfig) {
        self.options = config.options.clone();
        self.screens = config
            .registry()
            .iter_ordered()
            .into_iter()
            .map(|screen| ScreenEntry {
                name: screen.name.clone(),
                column: screen.cell.column,
                row: screen.cell.row,
                aliases: screen.settings.aliases.clone(),
                modifiers: screen.settings.modifiers,
                dead_corners: screen.settings.dead_corners,
                fixes: screen.settings.fixes,
            })
            .collect();
        self.hotkeys = config.hotkeys().to_vec();
    }

    /// Editor window large enough for the stored screens and at least the
    /// configured grid size.
    pub fn viewport(&self) -> GridViewport {
        let mut viewport = GridViewport::fit(self.screens.iter().map(|s| Cell::new(s.column, s.row)));
        viewport.columns = viewport.columns.max(self.grid.columns);
        viewport.rows = viewport.rows.max(self.grid.rows);
        viewport
    }

    /// Engine configuration path: the configured one, or `kvm-engine.conf`
    /// next to `settings_path`.
    pub fn engine_config_path(&self, settings_path: &Path) -> PathBuf {
        match &self.app.engine_config_path {
            Some(path) => path.clone(),
            None => settings_path.with_file_name("kvm-engine.conf"),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            debug!(path = %path.display(), screens = cfg.screens.len(), "settings loaded");
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "settings saved");
    Ok(())
}

/// Resolves the platform config base directory including the
/// `KVMConfigurator` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KVMConfigurator"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kvmconfigurator"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/KVMConfigurator
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KVMConfigurator")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kvm_topology::{ActionKind, KeyChord, ModifierKey, Trigger};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kvm_configurator_test_{}", Uuid::new_v4()))
    }

    fn sample_layout() -> ServerConfig {
        let mut config = ServerConfig::new();
        let desk = config.add_screen("desk", Cell::new(2, 1)).unwrap();
        config.add_screen("laptop", Cell::new(1, 1)).unwrap();
        config.set_aliases(desk, vec!["desk.local".to_string()]).unwrap();
        let mut modifiers = ModifierRemap::default();
        modifiers.alt = ModifierKey::Meta;
        config.set_modifiers(desk, modifiers).unwrap();
        config.options.switch_delay_ms = Some(250);
        config.options.dead_corners.bottom_left = true;
        config
            .add_hotkey(
                HotkeyAction::new(
                    KeyChord::parse("Control+F2").unwrap(),
                    ActionKind::SwitchToScreen { screen: "laptop".to_string() },
                )
                .with_trigger(Trigger::OnRelease),
            )
            .unwrap();
        config
    }

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_has_default_grid() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.grid.columns, 5);
        assert_eq!(cfg.grid.rows, 3);
    }

    #[test]
    fn test_app_config_default_has_no_screens() {
        let cfg = AppConfig::default();
        assert!(cfg.screens.is_empty());
        assert!(cfg.hotkeys.is_empty());
        assert_eq!(cfg.app.engine_config_path, None);
    }

    #[test]
    fn test_app_section_default_log_level_is_info() {
        let cfg = AppSection::default();
        assert_eq!(cfg.log_level, "info");
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_app_config_with_layout_round_trips() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.app.engine_config_path = Some(PathBuf::from("/etc/kvm/engine.conf"));
        cfg.store_server_config(&sample_layout());

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
        assert_eq!(restored.to_server_config().unwrap(), sample_layout());
    }

    #[test]
    fn test_disabled_timings_are_omitted() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(!toml_str.contains("heartbeat_ms"), "None heartbeat must be omitted");
        assert!(!toml_str.contains("engine_config_path"));
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        // Act
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");

        // Assert
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_grid_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[grid]
columns = 8
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.grid.columns, 8);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.grid.rows, 3);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let bad_toml = "[[[ not valid toml";
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(bad_toml);
        assert!(result.is_err());
    }

    // ── Domain conversion ─────────────────────────────────────────────────────

    #[test]
    fn test_to_server_config_rejects_two_screens_on_one_cell() {
        // Arrange
        let toml_str = r#"
[[screens]]
name = "a"
column = 0
row = 0

[[screens]]
name = "b"
column = 0
row = 0
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();

        // Act
        let result = cfg.to_server_config();

        // Assert
        assert!(matches!(
            result,
            Err(ConfigError::Layout { source: RegistryError::CellOccupied(_), .. })
        ));
    }

    #[test]
    fn test_to_server_config_rejects_hotkey_for_missing_screen() {
        let mut cfg = AppConfig::default();
        cfg.hotkeys.push(HotkeyAction::new(
            KeyChord::parse("F1").unwrap(),
            ActionKind::SwitchToScreen { screen: "ghost".to_string() },
        ));

        let result = cfg.to_server_config();

        assert!(matches!(
            result,
            Err(ConfigError::Layout { source: RegistryError::UnknownScreenName(_), .. })
        ));
    }

    #[test]
    fn test_viewport_covers_stored_screens() {
        let mut cfg = AppConfig::default();
        cfg.screens.push(ScreenEntry {
            name: "far".to_string(),
            column: 9,
            row: 0,
            aliases: Vec::new(),
            modifiers: ModifierRemap::default(),
            dead_corners: DeadCorners::default(),
            fixes: ScreenFixes::default(),
        });

        let viewport = cfg.viewport();

        assert!(viewport.contains(Cell::new(9, 0)));
        assert!(viewport.rows >= 3);
    }

    #[test]
    fn test_engine_config_path_defaults_next_to_settings() {
        let cfg = AppConfig::default();
        let path = cfg.engine_config_path(Path::new("/home/user/.config/kvmconfigurator/config.toml"));
        assert_eq!(path, PathBuf::from("/home/user/.config/kvmconfigurator/kvm-engine.conf"));
    }

    // ── load / save via temp directory ────────────────────────────────────────

    #[test]
    fn test_load_config_from_returns_default_when_file_absent() {
        let path = temp_dir().join("config.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.app.log_level = "debug".to_string();
        cfg.store_server_config(&sample_layout());

        // Act
        save_config_to(&path, &cfg).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.app.log_level, "debug");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_malformed_file_returns_parse_error() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[grid\ncolumns = ").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // If NoPlatformConfigDir is returned (e.g. in a stripped CI env) that is also acceptable.
    }
}
