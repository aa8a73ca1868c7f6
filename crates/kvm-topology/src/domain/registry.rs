//! Screen registry: the arena of screens plus an index from cell to screen.
//!
//! The two maps are always updated together, so the occupancy index is a
//! partial injective function from [`Cell`] to [`ScreenId`]: a cell holds at
//! most one screen and every screen occupies exactly one cell.
//!
//! Adjacency is never stored here.  The [`Topology`] view derives it from the
//! occupancy index and memoizes the result in a cache that every successful
//! mutation clears.

use std::cell::OnceCell;
use std::collections::HashMap;

use thiserror::Error;

use super::grid::{Cell, Direction};
use super::screen::{
    is_valid_name, DeadCorners, ModifierRemap, Screen, ScreenFixes, ScreenId, ScreenSettings,
};
use super::topology::{AdjacencyView, Topology};

/// Errors returned by registry mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A screen name was empty.
    #[error("screen name must not be empty")]
    EmptyName,

    /// A name or alias contains whitespace or characters reserved by the grammar.
    #[error("invalid screen name \"{0}\"")]
    InvalidName(String),

    /// The name or alias is already used by a screen name or alias.
    #[error("name \"{0}\" is already used by another screen name or alias")]
    NameConflict(String),

    /// The target cell already holds another screen.
    #[error("cell {0} is already occupied")]
    CellOccupied(Cell),

    /// The referenced screen does not exist in the registry.
    #[error("screen not found: {0}")]
    UnknownScreen(ScreenId),

    /// A name does not match any screen name or alias.
    #[error("unknown screen name \"{0}\"")]
    UnknownScreenName(String),

    /// Every cell from `from` to the edge of the plane in `direction` is taken.
    #[error("no vacant cell {direction} of {from}")]
    NoVacantCell { from: Cell, direction: Direction },
}

/// Owns every placed screen.
#[derive(Debug, Clone, Default)]
pub struct ScreenRegistry {
    /// All screens indexed by id.
    screens: HashMap<ScreenId, Screen>,
    /// Which screen occupies which cell.
    occupancy: HashMap<Cell, ScreenId>,
    /// Memoized adjacency; reset by every successful mutation.
    adjacency: OnceCell<AdjacencyView>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.screens.contains_key(&id)
    }

    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(&id)
    }

    /// Returns the id of the screen occupying `cell`, if any.
    pub fn id_at(&self, cell: Cell) -> Option<ScreenId> {
        self.occupancy.get(&cell).copied()
    }

    /// Returns the screen occupying `cell`, if any.
    pub fn at(&self, cell: Cell) -> Option<&Screen> {
        self.id_at(cell).and_then(|id| self.screens.get(&id))
    }

    /// Finds a screen by its canonical name (aliases are not considered).
    pub fn find_by_name(&self, name: &str) -> Option<&Screen> {
        self.screens.values().find(|s| s.name == name)
    }

    /// Resolves a screen name or alias to the owning screen's id.
    pub fn resolve_name(&self, name: &str) -> Option<ScreenId> {
        self.screens
            .values()
            .find(|s| s.name == name || s.settings.aliases.iter().any(|a| a == name))
            .map(|s| s.id)
    }

    /// Iterates all screens in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Screen> {
        self.screens.values()
    }

    /// Returns all screens ordered row-major by cell (top row first).
    pub fn iter_ordered(&self) -> Vec<&Screen> {
        let mut screens: Vec<&Screen> = self.screens.values().collect();
        screens.sort_by_key(|s| s.cell.row_major_key());
        screens
    }

    /// Returns a borrowed view answering adjacency questions.
    pub fn topology(&self) -> Topology<'_> {
        Topology::new(self)
    }

    pub(crate) fn adjacency_cache(&self) -> &OnceCell<AdjacencyView> {
        &self.adjacency
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// Places a new screen named `name` on `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] / [`RegistryError::InvalidName`] for
    /// unusable names, [`RegistryError::NameConflict`] if `name` equals any
    /// existing screen name or alias, and [`RegistryError::CellOccupied`] if
    /// `cell` is not vacant.
    pub fn add(&mut self, name: impl Into<String>, cell: Cell) -> Result<ScreenId, RegistryError> {
        let name = name.into();
        validate_name(&name)?;
        self.ensure_name_free(&name, None)?;
        if self.occupancy.contains_key(&cell) {
            return Err(RegistryError::CellOccupied(cell));
        }

        let id = ScreenId::new_v4();
        self.screens.insert(
            id,
            Screen {
                id,
                name,
                cell,
                settings: ScreenSettings::default(),
            },
        );
        self.occupancy.insert(cell, id);
        self.invalidate();
        Ok(id)
    }

    /// Renames a screen.
    ///
    /// # Errors
    ///
    /// Same name checks as [`ScreenRegistry::add`], ignoring the screen's own
    /// current name.  A new name equal to one of the screen's own aliases is a
    /// [`RegistryError::NameConflict`].
    pub fn rename(&mut self, id: ScreenId, new_name: impl Into<String>) -> Result<(), RegistryError> {
        let new_name = new_name.into();
        self.require(id)?;
        validate_name(&new_name)?;
        self.ensure_name_free(&new_name, Some(id))?;

        if let Some(screen) = self.screens.get_mut(&id) {
            screen.name = new_name;
        }
        self.invalidate();
        Ok(())
    }

    /// Replaces the alias list of a screen.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NameConflict`] if any alias equals the screen's
    /// own name, repeats inside `aliases`, or equals another screen's name or
    /// alias.
    pub fn set_aliases(&mut self, id: ScreenId, aliases: Vec<String>) -> Result<(), RegistryError> {
        let own_name = self.require(id)?.name.clone();
        self.check_aliases(id, &own_name, &aliases)?;

        if let Some(screen) = self.screens.get_mut(&id) {
            screen.settings.aliases = aliases;
        }
        self.invalidate();
        Ok(())
    }

    /// Removes a screen and vacates its cell.
    pub fn remove(&mut self, id: ScreenId) -> Result<Screen, RegistryError> {
        let screen = self
            .screens
            .remove(&id)
            .ok_or(RegistryError::UnknownScreen(id))?;
        self.occupancy.remove(&screen.cell);
        self.invalidate();
        Ok(screen)
    }

    /// Moves a screen to `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CellOccupied`] unless `cell` is vacant or is
    /// the screen's current cell.
    pub fn move_to(&mut self, id: ScreenId, cell: Cell) -> Result<(), RegistryError> {
        let current = self.require(id)?.cell;
        if current == cell {
            return Ok(());
        }
        if self.occupancy.contains_key(&cell) {
            return Err(RegistryError::CellOccupied(cell));
        }

        self.occupancy.remove(&current);
        self.occupancy.insert(cell, id);
        if let Some(screen) = self.screens.get_mut(&id) {
            screen.cell = cell;
        }
        self.invalidate();
        Ok(())
    }

    pub fn set_modifiers(&mut self, id: ScreenId, modifiers: ModifierRemap) -> Result<(), RegistryError> {
        self.require_mut(id)?.settings.modifiers = modifiers;
        Ok(())
    }

    pub fn set_dead_corners(&mut self, id: ScreenId, corners: DeadCorners) -> Result<(), RegistryError> {
        self.require_mut(id)?.settings.dead_corners = corners;
        Ok(())
    }

    pub fn set_fixes(&mut self, id: ScreenId, fixes: ScreenFixes) -> Result<(), RegistryError> {
        self.require_mut(id)?.settings.fixes = fixes;
        Ok(())
    }

    /// Checks that `id` could be renamed to `name` with `aliases`, without
    /// mutating anything.
    ///
    /// Used to validate a whole settings edit before any part of it is applied.
    pub fn check_identity(&self, id: ScreenId, name: &str, aliases: &[String]) -> Result<(), RegistryError> {
        self.require(id)?;
        validate_name(name)?;
        // The screen's aliases are about to be replaced, so only other
        // screens and the new alias list take part in the name check.
        if self.name_used_by_others(name, id) || aliases.iter().any(|a| a == name) {
            return Err(RegistryError::NameConflict(name.to_string()));
        }
        self.check_aliases(id, name, aliases)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn require(&self, id: ScreenId) -> Result<&Screen, RegistryError> {
        self.screens.get(&id).ok_or(RegistryError::UnknownScreen(id))
    }

    fn require_mut(&mut self, id: ScreenId) -> Result<&mut Screen, RegistryError> {
        self.screens
            .get_mut(&id)
            .ok_or(RegistryError::UnknownScreen(id))
    }

    fn invalidate(&mut self) {
        self.adjacency = OnceCell::new();
    }

    /// `true` if any screen other than `owner` uses `name` as name or alias.
    fn name_used_by_others(&self, name: &str, owner: ScreenId) -> bool {
        self.screens.values().any(|s| {
            s.id != owner && (s.name == name || s.settings.aliases.iter().any(|a| a == name))
        })
    }

    fn ensure_name_free(&self, name: &str, owner: Option<ScreenId>) -> Result<(), RegistryError> {
        let taken = self.screens.values().any(|s| {
            let is_owner = Some(s.id) == owner;
            (!is_owner && s.name == name) || s.settings.aliases.iter().any(|a| a == name)
        });
        if taken {
            return Err(RegistryError::NameConflict(name.to_string()));
        }
        Ok(())
    }

    fn check_aliases(&self, id: ScreenId, own_name: &str, aliases: &[String]) -> Result<(), RegistryError> {
        for (i, alias) in aliases.iter().enumerate() {
            validate_name(alias)?;
            let repeated = aliases[..i].contains(alias);
            if alias == own_name || repeated || self.name_used_by_others(alias, id) {
                return Err(RegistryError::NameConflict(alias.clone()));
            }
        }
        Ok(())
    }
}

/// Content equality: two registries are equal when they hold screens with the
/// same names, cells and settings.  Ids are opaque and not compared.
impl PartialEq for ScreenRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.screens.values().all(|mine| {
                other.find_by_name(&mine.name).is_some_and(|theirs| {
                    theirs.cell == mine.cell && theirs.settings == mine.settings
                })
            })
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    if !is_valid_name(name) {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
