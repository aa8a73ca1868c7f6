//! Use case: place a client that announced itself through auto-configuration.
//!
//! When a client connects to the engine without being in the layout, the
//! engine reports its name (and optionally the side of the server the user
//! picked on the client).  This use case finds a free cell for it.

use kvm_topology::{Cell, Direction, GridViewport, RegistryError, ScreenId, ServerConfig};
use tracing::{debug, info};

/// Cell the server screen gets when a client is placed before the server.
pub const DEFAULT_SERVER_CELL: Cell = Cell::new(2, 1);

/// Result of [`auto_place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlacement {
    /// The client was added at `cell`.
    Placed { id: ScreenId, cell: Cell },
    /// A screen with this name (or alias) already exists.
    AlreadyPresent(ScreenId),
    /// Auto-configured clients are switched off in the options.
    Ignored,
}

/// Places the client `name` next to the server.
///
/// - With a `preference`, walks from the server in that direction and takes
///   the first vacant cell.
/// - Without one, takes the first vacant cell of `viewport` in row-major
///   order.  A full viewport grows by one column and the new column is used.
///
/// The server itself is added at [`DEFAULT_SERVER_CELL`] (or the nearest free
/// cell to its right) if it is not in the layout yet.
///
/// # Errors
///
/// Returns [`RegistryError::EmptyName`] / [`RegistryError::InvalidName`] when
/// `name` or `server_name` cannot be used as a screen name, and
/// [`RegistryError::NoVacantCell`] when the walk reaches the edge of the plane
/// without finding a free cell.
pub fn auto_place(
    config: &mut ServerConfig,
    viewport: &mut GridViewport,
    name: &str,
    server_name: &str,
    preference: Option<Direction>,
) -> Result<AutoPlacement, RegistryError> {
    if config.options.ignore_auto_config_clients {
        debug!(%name, "auto-configured client ignored");
        return Ok(AutoPlacement::Ignored);
    }
    if let Some(existing) = config.registry().resolve_name(name) {
        debug!(%name, "auto-configured client already placed");
        return Ok(AutoPlacement::AlreadyPresent(existing));
    }

    let server = match config.registry().find_by_name(server_name) {
        Some(screen) => screen.cell,
        None => {
            let cell = walk_to_vacant(config, DEFAULT_SERVER_CELL, Direction::Right)?;
            config.add_screen(server_name, cell)?;
            info!(server = %server_name, %cell, "server screen added");
            cell
        }
    };

    let cell = match preference {
        Some(direction) => {
            let start = server.step(direction).ok_or(RegistryError::NoVacantCell {
                from: server,
                direction,
            })?;
            walk_to_vacant(config, start, direction)?
        }
        None => first_vacant_in_viewport(config, viewport)?,
    };
    let id = config.add_screen(name, cell)?;
    viewport.expand_to_include(cell);
    info!(client = %name, %cell, "auto-configured client placed");
    Ok(AutoPlacement::Placed { id, cell })
}

/// First vacant cell at or after `start`, stepping in `direction`.
fn walk_to_vacant(config: &ServerConfig, start: Cell, direction: Direction) -> Result<Cell, RegistryError> {
    let mut cell = start;
    while config.registry().id_at(cell).is_some() {
        cell = cell
            .step(direction)
            .ok_or(RegistryError::NoVacantCell { from: start, direction })?;
    }
    Ok(cell)
}

fn first_vacant_in_viewport(config: &ServerConfig, viewport: &GridViewport) -> Result<Cell, RegistryError> {
    if let Some(cell) = viewport
        .cells()
        .find(|cell| config.registry().id_at(*cell).is_none())
    {
        return Ok(cell);
    }
    // Every cell is taken: the first cell of a new column on the right is
    // vacant because the column lies outside the old window.
    let top_right = Cell::new(viewport.last_column(), viewport.origin.row);
    let start = top_right.step(Direction::Right).ok_or(RegistryError::NoVacantCell {
        from: top_right,
        direction: Direction::Right,
    })?;
    walk_to_vacant(config, start, Direction::Down)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
