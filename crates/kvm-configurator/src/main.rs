//! KVM-Configurator command-line front-end.
//!
//! Edits the screen layout stored in the settings file and exports it in the
//! synchronization engine's configuration grammar.
//!
//! # Usage
//!
//! ```text
//! kvm-configurator [--config <PATH>] <COMMAND>
//!
//! Commands:
//!   show                           Print the grid and the derived links
//!   export [--out <PATH>]          Write the engine configuration
//!   import <PATH>                  Replace the layout with an engine configuration
//!   add <NAME> [--direction <DIR>] Place a client next to the server
//!   move <NAME> <COLUMN> <ROW>     Move a screen to another cell
//!   remove <NAME>                  Delete a screen
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                  | Description                          |
//! |---------------------------|--------------------------------------|
//! | `KVM_CONFIGURATOR_CONFIG` | Settings file instead of the default |
//! | `RUST_LOG`                | Log filter, overrides `log_level`    |

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kvm_configurator::application::auto_place::{auto_place, AutoPlacement};
use kvm_configurator::application::config_io::{export_engine_config, open_engine_config};
use kvm_configurator::application::placement::{DragSource, PlacementController};
use kvm_configurator::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, AppConfig,
};
use kvm_configurator::infrastructure::storage::engine_file::{
    load_document, write_document_cancellable, WriteOutcome,
};
use kvm_topology::{Cell, Direction, GridViewport, ScreenId, ServerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Screen layout editor for a software KVM switch.
#[derive(Debug, Parser)]
#[command(
    name = "kvm-configurator",
    about = "Screen layout editor and engine configuration writer",
    version
)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true, env = "KVM_CONFIGURATOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the grid with screen names and the list of links.
    Show,

    /// Validate the layout and write the engine configuration.
    ///
    /// Press Ctrl+C to abort; the previous file is kept.
    Export {
        /// Output file.  Defaults to `engine_config_path` from the settings.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Read an engine configuration and store it as the layout.
    Import {
        path: PathBuf,
    },

    /// Place a client next to the server, as auto-configuration would.
    Add {
        name: String,
        /// Side of the server to place the client on.
        #[arg(long, value_parser = parse_direction)]
        direction: Option<Direction>,
    },

    /// Move a screen to another cell.
    Move {
        name: String,
        #[arg(allow_hyphen_values = true)]
        column: i32,
        #[arg(allow_hyphen_values = true)]
        row: i32,
    },

    /// Delete a screen and the hotkeys that only applied to it.
    Remove {
        name: String,
    },
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    Direction::from_keyword(value)
        .ok_or_else(|| format!("expected left, right, up or down, got '{value}'"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap`.
/// 2. The settings file is loaded (defaults on first run).
/// 3. `tracing_subscriber` is initialised.  `RUST_LOG` wins; otherwise the
///    `log_level` from the settings file is used.
/// 4. The stored layout is rebuilt and the subcommand runs against it.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = match cli.config {
        Some(path) => path,
        None => config_file_path().context("no settings file location; pass --config")?,
    };
    let mut settings = load_config_from(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level)),
        )
        .init();

    let mut layout = settings
        .to_server_config()
        .with_context(|| format!("stored layout in {} is invalid", settings_path.display()))?;

    match cli.command {
        Command::Show => {
            print!("{}", render_grid(&layout, &settings.viewport()));
            print!("{}", render_links(&layout));
        }

        Command::Export { out } => {
            let path = out.unwrap_or_else(|| settings.engine_config_path(&settings_path));
            let document = export_engine_config(&layout).context("layout cannot be exported")?;
            match write_document_cancellable(&path, &document, ctrl_c()).await? {
                WriteOutcome::Written => println!("wrote {}", path.display()),
                WriteOutcome::Cancelled => println!("export cancelled, {} unchanged", path.display()),
            }
        }

        Command::Import { path } => {
            let document = load_document(&path)?;
            open_engine_config(&mut layout, &document)
                .with_context(|| format!("{} was not imported", path.display()))?;
            store(&mut settings, &layout, &settings_path)?;
            println!("imported {} screens", layout.registry().len());
        }

        Command::Add { name, direction } => {
            let mut viewport = settings.viewport();
            let server = settings.app.server_name.clone();
            match auto_place(&mut layout, &mut viewport, &name, &server, direction)? {
                AutoPlacement::Placed { cell, .. } => {
                    store(&mut settings, &layout, &settings_path)?;
                    println!("placed {name} at {cell}");
                }
                AutoPlacement::AlreadyPresent(_) => println!("{name} is already placed"),
                AutoPlacement::Ignored => println!("auto-configured clients are ignored"),
            }
        }

        Command::Move { name, column, row } => {
            let id = screen_id(&layout, &name)?;
            let mut controller = PlacementController::new();
            controller.begin_drag(&layout, DragSource::Existing(id))?;
            controller.drop_on_grid(&mut layout, Cell::new(column, row))?;
            store(&mut settings, &layout, &settings_path)?;
            report_connectivity(&layout);
        }

        Command::Remove { name } => {
            let id = screen_id(&layout, &name)?;
            let mut controller = PlacementController::new();
            controller.begin_drag(&layout, DragSource::Existing(id))?;
            let removed = controller.drop_on_removal_target(&mut layout)?;
            store(&mut settings, &layout, &settings_path)?;
            println!("removed {}", removed.name);
            report_connectivity(&layout);
        }
    }

    Ok(())
}

/// Resolves when Ctrl+C is pressed.  Never resolves if the signal handler
/// cannot be installed, so a failed install does not cancel the write.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C signal: {e}");
        std::future::pending::<()>().await;
    }
}

fn screen_id(layout: &ServerConfig, name: &str) -> anyhow::Result<ScreenId> {
    layout
        .registry()
        .resolve_name(name)
        .with_context(|| format!("no screen named '{name}'"))
}

fn store(settings: &mut AppConfig, layout: &ServerConfig, path: &std::path::Path) -> anyhow::Result<()> {
    settings.store_server_config(layout);
    save_config_to(path, settings)
        .with_context(|| format!("failed to save settings to {}", path.display()))?;
    info!(path = %path.display(), "layout saved");
    Ok(())
}

fn report_connectivity(layout: &ServerConfig) {
    let components = layout.topology().components().len();
    if components > 1 {
        println!("note: the layout has {components} separate groups and cannot be exported yet");
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Longest label drawn in a grid cell.
const MAX_LABEL: usize = 12;

/// Draws `viewport` one row per line; vacant cells are `.`.
fn render_grid(layout: &ServerConfig, viewport: &GridViewport) -> String {
    let width = layout
        .registry()
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_LABEL);

    let mut out = String::new();
    for row in viewport.origin.row..=viewport.last_row() {
        let mut line = String::new();
        for column in viewport.origin.column..=viewport.last_column() {
            let label: String = match layout.registry().at(Cell::new(column, row)) {
                Some(screen) => screen.name.chars().take(width).collect(),
                None => ".".to_string(),
            };
            let _ = write!(line, "{label:<width$} ");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// One `name direction = neighbor` line per link.
fn render_links(layout: &ServerConfig) -> String {
    let registry = layout.registry();
    let name = |id| registry.get(id).map_or("?", |s| s.name.as_str());

    let mut out = String::new();
    for link in layout.topology().links() {
        let _ = writeln!(out, "{} {} = {}", name(link.from), link.direction, name(link.to));
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_show_subcommand() {
        // Arrange / Act
        let cli = Cli::parse_from(["kvm-configurator", "show"]);

        // Assert
        assert!(matches!(cli.command, Command::Show));
    }

    #[test]
    fn test_cli_global_config_after_subcommand() {
        let cli = Cli::parse_from(["kvm-configurator", "show", "--config", "/tmp/kvm.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/kvm.toml")));
    }

    #[test]
    fn test_cli_export_out_override() {
        let cli = Cli::parse_from(["kvm-configurator", "export", "--out", "engine.conf"]);
        assert!(matches!(cli.command, Command::Export { out: Some(p) } if p == PathBuf::from("engine.conf")));
    }

    #[test]
    fn test_cli_add_parses_direction() {
        let cli = Cli::parse_from(["kvm-configurator", "add", "laptop", "--direction", "left"]);
        assert!(matches!(
            cli.command,
            Command::Add { ref name, direction: Some(Direction::Left) } if name == "laptop"
        ));
    }

    #[test]
    fn test_cli_add_rejects_unknown_direction() {
        let result = Cli::try_parse_from(["kvm-configurator", "add", "laptop", "--direction", "north"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_move_accepts_negative_cells() {
        let cli = Cli::parse_from(["kvm-configurator", "move", "tv", "-1", "-2"]);
        assert!(matches!(
            cli.command,
            Command::Move { column: -1, row: -2, .. }
        ));
    }

    #[test]
    fn test_render_grid_marks_vacant_cells() {
        // Arrange
        let mut layout = ServerConfig::new();
        layout.add_screen("a", Cell::new(0, 0)).unwrap();
        layout.add_screen("b", Cell::new(1, 0)).unwrap();
        let viewport = GridViewport::new(Cell::new(0, 0), 3, 2);

        // Act
        let text = render_grid(&layout, &viewport);

        // Assert
        assert_eq!(text, "a b .\n. . .\n");
    }

    #[test]
    fn test_render_links_lists_both_directions() {
        let mut layout = ServerConfig::new();
        layout.add_screen("a", Cell::new(0, 0)).unwrap();
        layout.add_screen("b", Cell::new(1, 0)).unwrap();

        let text = render_links(&layout);

        assert_eq!(text, "a right = b\nb left = a\n");
    }
}
