//! PlacementController: turns drag-and-drop gestures into registry changes.
//!
//! The controller only remembers the drag that is in flight.  The
//! [`ServerConfig`] being edited is passed in by the caller for every gesture,
//! so the controller never holds a second copy of the model.
//!
//! # Screen lifecycle (for beginners)
//!
//! ```text
//!   palette ──drag──▶ Unplaced ──drop on grid──▶ Placed ──drop on bin──▶ Removed
//!                                                  │  ▲
//!                                                  └──┘ drop on another cell
//! ```
//!
//! A new screen is dragged from the palette and only enters the registry when
//! it is dropped on a grid cell.  A placed screen can be dragged to another
//! cell or onto the removal target ("trash bin"), which deletes it straight
//! away.  A rejected drop (occupied cell, duplicate name) changes nothing.

use kvm_topology::{Cell, RegistryError, Screen, ScreenId, ServerConfig};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::edit_screen::{edit_screen_settings, EditOutcome, SettingsForm};

/// Errors returned by placement gestures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// A drop arrived without a preceding drag.
    #[error("no drag in progress")]
    NoDragInProgress,

    /// Only a placed screen can be dropped on the removal target.
    #[error("only a placed screen can be removed")]
    NothingToRemove,

    /// The registry rejected the change.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A screen that does not exist yet, dragged from the palette.
    NewScreen { name: String },
    /// A screen that is already on the grid.
    Existing(ScreenId),
}

/// Where a screen is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    /// Being dragged from the palette; not in the registry yet.
    Unplaced,
    /// On the grid at this cell.
    Placed(Cell),
    /// Deleted (or never issued by this configuration).
    Removed,
}

/// Reports whether `id` is still on the grid.
pub fn placement_state(config: &ServerConfig, id: ScreenId) -> PlacementState {
    match config.registry().get(id) {
        Some(screen) => PlacementState::Placed(screen.cell),
        None => PlacementState::Removed,
    }
}

/// Tracks the in-flight drag of the layout editor.
#[derive(Debug, Default)]
pub struct PlacementController {
    drag: Option<DragSource>,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the drag in flight, if any.
    pub fn current_drag(&self) -> Option<&DragSource> {
        self.drag.as_ref()
    }

    /// Lifecycle state of whatever is being dragged.
    pub fn dragged_state(&self, config: &ServerConfig) -> Option<PlacementState> {
        self.drag.as_ref().map(|source| match source {
            DragSource::NewScreen { .. } => PlacementState::Unplaced,
            DragSource::Existing(id) => placement_state(config, *id),
        })
    }

    /// Starts a drag, replacing any drag already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownScreen`] (wrapped) when dragging an id
    /// that is not in `config`.
    pub fn begin_drag(&mut self, config: &ServerConfig, source: DragSource) -> Result<(), PlacementError> {
        if let DragSource::Existing(id) = &source {
            if !config.registry().contains(*id) {
                return Err(RegistryError::UnknownScreen(*id).into());
            }
        }
        if let Some(previous) = self.drag.replace(source) {
            debug!(?previous, "drag replaced");
        }
        Ok(())
    }

    /// Drops the dragged screen on `cell`.
    ///
    /// A new screen is added there; an existing one is moved.  The drag ends
    /// whether or not the drop is accepted, and a rejected drop leaves the
    /// configuration untouched.
    ///
    /// # Errors
    ///
    /// - [`PlacementError::NoDragInProgress`] without a preceding
    ///   [`begin_drag`](Self::begin_drag).
    /// - [`RegistryError::CellOccupied`] / [`RegistryError::NameConflict`]
    ///   (wrapped) when the registry refuses.
    pub fn drop_on_grid(&mut self, config: &mut ServerConfig, cell: Cell) -> Result<ScreenId, PlacementError> {
        let source = self.drag.take().ok_or(PlacementError::NoDragInProgress)?;
        let result = match &source {
            DragSource::NewScreen { name } => config.add_screen(name.clone(), cell),
            DragSource::Existing(id) => config.move_screen(*id, cell).map(|()| *id),
        };
        match result {
            Ok(id) => {
                debug!(%id, %cell, "drop accepted");
                Ok(id)
            }
            Err(e) => {
                warn!(?source, %cell, error = %e, "drop rejected");
                Err(e.into())
            }
        }
    }

    /// Drops the dragged screen on the removal target, deleting it.
    ///
    /// There is no confirmation step.  Hotkeys that only referred to the
    /// removed screen are dropped with it.
    ///
    /// # Errors
    ///
    /// - [`PlacementError::NoDragInProgress`] without a drag.
    /// - [`PlacementError::NothingToRemove`] when the drag is a new screen.
    pub fn drop_on_removal_target(&mut self, config: &mut ServerConfig) -> Result<Screen, PlacementError> {
        match self.drag.take() {
            None => Err(PlacementError::NoDragInProgress),
            Some(DragSource::NewScreen { name }) => {
                debug!(%name, "unplaced screen dropped on removal target");
                Err(PlacementError::NothingToRemove)
            }
            Some(DragSource::Existing(id)) => {
                let screen = config.remove_screen(id)?;
                debug!(name = %screen.name, "screen removed by drag");
                Ok(screen)
            }
        }
    }

    /// Abandons the drag in flight.  Nothing changes in the configuration.
    pub fn cancel_drag(&mut self) -> Option<DragSource> {
        self.drag.take()
    }

    /// Opens the settings form for a placed screen and applies the result.
    ///
    /// See [`edit_screen_settings`] for the validation loop.
    pub fn edit_settings(
        &self,
        config: &mut ServerConfig,
        id: ScreenId,
        form: &mut dyn SettingsForm,
    ) -> Result<EditOutcome, PlacementError> {
        Ok(edit_screen_settings(config, id, form)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
