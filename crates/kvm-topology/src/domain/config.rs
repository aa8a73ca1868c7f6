//! The server configuration aggregate.
//!
//! [`ServerConfig`] bundles the screen registry, the hotkey list and the
//! global options.  It is an ordinary owned value: the editor holds one and
//! passes it by reference to whichever component needs it.
//!
//! Screen mutations go through this type rather than the registry directly so
//! that hotkeys never refer to a screen name that no longer exists.

use tracing::debug;

use super::grid::Cell;
use super::hotkey::{ActionKind, HotkeyAction, ScreenRemoval};
use super::options::GlobalOptions;
use super::registry::{RegistryError, ScreenRegistry};
use super::screen::{DeadCorners, ModifierRemap, Screen, ScreenFixes, ScreenId, ScreenSettings};
use super::topology::Topology;

/// A complete set of values from the screen settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenEdit {
    pub name: String,
    pub aliases: Vec<String>,
    pub modifiers: ModifierRemap,
    pub dead_corners: DeadCorners,
    pub fixes: ScreenFixes,
}

impl ScreenEdit {
    /// Pre-fills an edit with the screen's current values.
    pub fn from_screen(screen: &Screen) -> Self {
        Self {
            name: screen.name.clone(),
            aliases: screen.settings.aliases.clone(),
            modifiers: screen.settings.modifiers,
            dead_corners: screen.settings.dead_corners,
            fixes: screen.settings.fixes,
        }
    }
}

/// Screens, hotkeys and options edited by the front-end.
///
/// Equality compares content and ignores screen ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
    registry: ScreenRegistry,
    hotkeys: Vec<HotkeyAction>,
    pub options: GlobalOptions,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    pub fn topology(&self) -> Topology<'_> {
        self.registry.topology()
    }

    pub fn hotkeys(&self) -> &[HotkeyAction] {
        &self.hotkeys
    }

    // ── Screens ───────────────────────────────────────────────────────────────

    /// See [`ScreenRegistry::add`].
    pub fn add_screen(&mut self, name: impl Into<String>, cell: Cell) -> Result<ScreenId, RegistryError> {
        let id = self.registry.add(name, cell)?;
        debug!(%id, %cell, "screen added");
        Ok(id)
    }

    /// Adds a screen together with all of its settings, or nothing at all.
    pub fn insert_screen(
        &mut self,
        name: impl Into<String>,
        cell: Cell,
        settings: ScreenSettings,
    ) -> Result<ScreenId, RegistryError> {
        let id = self.registry.add(name, cell)?;
        if let Err(e) = self.registry.set_aliases(id, settings.aliases) {
            // Roll back so a rejected alias does not leave a half-built screen.
            let _ = self.registry.remove(id);
            return Err(e);
        }
        self.registry.set_modifiers(id, settings.modifiers)?;
        self.registry.set_dead_corners(id, settings.dead_corners)?;
        self.registry.set_fixes(id, settings.fixes)?;
        Ok(id)
    }

    /// Renames a screen and rewrites hotkeys that refer to the old name.
    pub fn rename_screen(&mut self, id: ScreenId, new_name: impl Into<String>) -> Result<(), RegistryError> {
        let new_name = new_name.into();
        let old_name = self.screen(id)?.name.clone();
        self.registry.rename(id, new_name.clone())?;
        self.retarget_hotkeys(&old_name, &new_name);
        Ok(())
    }

    /// See [`ScreenRegistry::set_aliases`].
    pub fn set_aliases(&mut self, id: ScreenId, aliases: Vec<String>) -> Result<(), RegistryError> {
        self.registry.set_aliases(id, aliases)
    }

    /// See [`ScreenRegistry::move_to`].
    pub fn move_screen(&mut self, id: ScreenId, cell: Cell) -> Result<(), RegistryError> {
        self.registry.move_to(id, cell)?;
        debug!(%id, %cell, "screen moved");
        Ok(())
    }

    /// Removes a screen and cleans up hotkeys that referenced it.
    ///
    /// Actions that only make sense for this screen are discarded; actions
    /// scoped to several screens just lose this one.
    pub fn remove_screen(&mut self, id: ScreenId) -> Result<Screen, RegistryError> {
        let screen = self.registry.remove(id)?;

        let before = self.hotkeys.len();
        self.hotkeys
            .retain_mut(|action| action.forget_screen(&screen.name) != ScreenRemoval::Invalidated);
        debug!(
            name = %screen.name,
            dropped_hotkeys = before - self.hotkeys.len(),
            "screen removed"
        );
        Ok(screen)
    }

    pub fn set_modifiers(&mut self, id: ScreenId, modifiers: ModifierRemap) -> Result<(), RegistryError> {
        self.registry.set_modifiers(id, modifiers)
    }

    pub fn set_dead_corners(&mut self, id: ScreenId, corners: DeadCorners) -> Result<(), RegistryError> {
        self.registry.set_dead_corners(id, corners)
    }

    pub fn set_fixes(&mut self, id: ScreenId, fixes: ScreenFixes) -> Result<(), RegistryError> {
        self.registry.set_fixes(id, fixes)
    }

    /// Applies a whole settings edit.
    ///
    /// The name and aliases are validated before anything changes, so on
    /// error the screen is exactly as it was.
    pub fn apply_screen_edit(&mut self, id: ScreenId, edit: &ScreenEdit) -> Result<(), RegistryError> {
        self.registry.check_identity(id, &edit.name, &edit.aliases)?;
        let old_name = self.screen(id)?.name.clone();

        // Clear the aliases first so a name/alias swap does not trip the
        // rename's own-alias check.
        self.registry.set_aliases(id, Vec::new())?;
        self.registry.rename(id, edit.name.clone())?;
        self.registry.set_aliases(id, edit.aliases.clone())?;
        self.registry.set_modifiers(id, edit.modifiers)?;
        self.registry.set_dead_corners(id, edit.dead_corners)?;
        self.registry.set_fixes(id, edit.fixes)?;

        if old_name != edit.name {
            self.retarget_hotkeys(&old_name, &edit.name);
        }
        debug!(%id, name = %edit.name, "screen settings applied");
        Ok(())
    }

    // ── Hotkeys ───────────────────────────────────────────────────────────────

    /// Appends a hotkey action.
    ///
    /// Screen names in the action may be aliases; they are stored as the
    /// canonical screen name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownScreenName`] if the action names a
    /// screen that is not registered.
    pub fn add_hotkey(&mut self, mut action: HotkeyAction) -> Result<(), RegistryError> {
        if let ActionKind::SwitchToScreen { screen } = &mut action.kind {
            *screen = self.canonical_name(screen)?;
        }
        for name in action.scope.iter_mut() {
            *name = self.canonical_name(name)?;
        }
        self.hotkeys.push(action);
        Ok(())
    }

    /// Removes the hotkey at `index`, returning it.
    pub fn remove_hotkey(&mut self, index: usize) -> Option<HotkeyAction> {
        (index < self.hotkeys.len()).then(|| self.hotkeys.remove(index))
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn screen(&self, id: ScreenId) -> Result<&Screen, RegistryError> {
        self.registry.get(id).ok_or(RegistryError::UnknownScreen(id))
    }

    fn canonical_name(&self, name: &str) -> Result<String, RegistryError> {
        self.registry
            .resolve_name(name)
            .and_then(|id| self.registry.get(id))
            .map(|s| s.name.clone())
            .ok_or_else(|| RegistryError::UnknownScreenName(name.to_string()))
    }

    fn retarget_hotkeys(&mut self, old: &str, new: &str) {
        for action in &mut self.hotkeys {
            action.rename_screen(old, new);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Direction;
    use crate::domain::hotkey::{KeyChord, LockMode};
    use crate::domain::screen::ModifierKey;

    fn chord(s: &str) -> KeyChord {
        KeyChord::parse(s).unwrap()
    }

    fn three_screens() -> (ServerConfig, ScreenId, ScreenId, ScreenId) {
        let mut config = ServerConfig::new();
        let a = config.add_screen("A", Cell::new(0, 0)).unwrap();
        let b = config.add_screen("B", Cell::new(1, 0)).unwrap();
        let c = config.add_screen("C", Cell::new(2, 0)).unwrap();
        (config, a, b, c)
    }

    // ── remove_screen and hotkeys ─────────────────────────────────────────────

    #[test]
    fn test_remove_screen_invalidates_single_screen_hotkey() {
        // Arrange
        let (mut config, _, b, _) = three_screens();
        config
            .add_hotkey(
                HotkeyAction::new(chord("F1"), ActionKind::LockCursorToScreen { mode: LockMode::On })
                    .with_scope(["B"]),
            )
            .unwrap();

        // Act
        config.remove_screen(b).unwrap();

        // Assert
        assert!(config.hotkeys().is_empty());
    }

    #[test]
    fn test_remove_screen_trims_multi_screen_scope() {
        let (mut config, _, b, _) = three_screens();
        config
            .add_hotkey(
                HotkeyAction::new(chord("F2"), ActionKind::SwitchInDirection { direction: Direction::Right })
                    .with_scope(["A", "B"]),
            )
            .unwrap();

        config.remove_screen(b).unwrap();

        assert_eq!(config.hotkeys().len(), 1);
        assert_eq!(config.hotkeys()[0].scope, vec!["A".to_string()]);
    }

    #[test]
    fn test_remove_screen_drops_switch_to_that_screen() {
        let (mut config, _, _, c) = three_screens();
        config
            .add_hotkey(HotkeyAction::new(
                chord("F3"),
                ActionKind::SwitchToScreen { screen: "C".to_string() },
            ))
            .unwrap();
        config
            .add_hotkey(HotkeyAction::new(chord("F4"), ActionKind::RestartServer))
            .unwrap();

        config.remove_screen(c).unwrap();

        assert_eq!(config.hotkeys().len(), 1);
        assert_eq!(config.hotkeys()[0].kind, ActionKind::RestartServer);
    }

    // ── rename_screen ─────────────────────────────────────────────────────────

    #[test]
    fn test_rename_screen_rewrites_hotkey_references() {
        let (mut config, a, _, _) = three_screens();
        config
            .add_hotkey(
                HotkeyAction::new(chord("F1"), ActionKind::SwitchToScreen { screen: "A".to_string() })
                    .with_scope(["A", "B"]),
            )
            .unwrap();

        config.rename_screen(a, "Alpha").unwrap();

        let action = &config.hotkeys()[0];
        assert_eq!(action.kind, ActionKind::SwitchToScreen { screen: "Alpha".to_string() });
        assert_eq!(action.scope, vec!["Alpha".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_rename_screen_conflict_leaves_hotkeys_untouched() {
        let (mut config, a, _, _) = three_screens();
        config
            .add_hotkey(HotkeyAction::new(
                chord("F1"),
                ActionKind::SwitchToScreen { screen: "A".to_string() },
            ))
            .unwrap();

        assert_eq!(
            config.rename_screen(a, "B"),
            Err(RegistryError::NameConflict("B".to_string()))
        );
        assert_eq!(
            config.hotkeys()[0].kind,
            ActionKind::SwitchToScreen { screen: "A".to_string() }
        );
    }

    // ── add_hotkey ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_hotkey_rejects_unknown_screen() {
        let (mut config, _, _, _) = three_screens();
        let result = config.add_hotkey(HotkeyAction::new(
            chord("F1"),
            ActionKind::SwitchToScreen { screen: "ghost".to_string() },
        ));
        assert_eq!(result, Err(RegistryError::UnknownScreenName("ghost".to_string())));
        assert!(config.hotkeys().is_empty());
    }

    #[test]
    fn test_add_hotkey_stores_canonical_name_for_alias() {
        let (mut config, a, _, _) = three_screens();
        config.set_aliases(a, vec!["laptop".to_string()]).unwrap();

        config
            .add_hotkey(HotkeyAction::new(
                chord("F1"),
                ActionKind::SwitchToScreen { screen: "laptop".to_string() },
            ))
            .unwrap();

        assert_eq!(
            config.hotkeys()[0].kind,
            ActionKind::SwitchToScreen { screen: "A".to_string() }
        );
    }

    #[test]
    fn test_remove_hotkey_out_of_range_returns_none() {
        let (mut config, _, _, _) = three_screens();
        assert!(config.remove_hotkey(0).is_none());
    }

    // ── apply_screen_edit ─────────────────────────────────────────────────────

    #[test]
    fn test_apply_screen_edit_updates_everything() {
        let (mut config, a, _, _) = three_screens();
        let mut edit = ScreenEdit::from_screen(config.registry().get(a).unwrap());
        edit.name = "Desk".to_string();
        edit.aliases = vec!["desk.local".to_string()];
        edit.modifiers.alt = ModifierKey::Meta;
        edit.dead_corners.top_left = true;
        edit.fixes.half_duplex_caps_lock = true;

        config.apply_screen_edit(a, &edit).unwrap();

        let screen = config.registry().get(a).unwrap();
        assert_eq!(ScreenEdit::from_screen(screen), edit);
    }

    #[test]
    fn test_apply_screen_edit_swaps_name_and_alias() {
        let (mut config, a, _, _) = three_screens();
        config.set_aliases(a, vec!["alpha".to_string()]).unwrap();
        let mut edit = ScreenEdit::from_screen(config.registry().get(a).unwrap());
        edit.name = "alpha".to_string();
        edit.aliases = vec!["A".to_string()];

        assert!(config.apply_screen_edit(a, &edit).is_ok());
        assert_eq!(config.registry().get(a).unwrap().name, "alpha");
    }

    #[test]
    fn test_apply_screen_edit_conflict_changes_nothing() {
        let (mut config, a, _, _) = three_screens();
        let before = config.clone();
        let mut edit = ScreenEdit::from_screen(config.registry().get(a).unwrap());
        edit.aliases = vec!["B".to_string()];
        edit.fixes.half_duplex_num_lock = true;

        assert_eq!(
            config.apply_screen_edit(a, &edit),
            Err(RegistryError::NameConflict("B".to_string()))
        );
        assert_eq!(config, before);
    }

    // ── insert_screen ─────────────────────────────────────────────────────────

    #[test]
    fn test_insert_screen_with_bad_alias_adds_nothing() {
        let (mut config, _, _, _) = three_screens();
        let settings = ScreenSettings {
            aliases: vec!["A".to_string()],
            ..ScreenSettings::default()
        };

        let result = config.insert_screen("D", Cell::new(3, 0), settings);

        assert_eq!(result, Err(RegistryError::NameConflict("A".to_string())));
        assert_eq!(config.registry().len(), 3);
        assert!(config.registry().at(Cell::new(3, 0)).is_none());
    }
}
