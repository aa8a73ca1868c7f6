//! Use case: edit the settings of a placed screen through a form.
//!
//! The form itself lives outside this crate (a dialog in the desktop UI, a
//! prompt in a terminal front-end).  It is reached through the
//! [`SettingsForm`] trait so the validation loop can be tested without any UI.
//!
//! # Validation loop (for beginners)
//!
//! ```text
//! draft = current settings
//! loop {
//!     form.show(draft, problem)  ──▶ None          → Cancelled, nothing changes
//!                                ──▶ Some(edited)  → validate
//!     valid?   yes → apply, Applied
//!              no  → problem = what went wrong, draft = edited, show again
//! }
//! ```
//!
//! The form is never closed on a validation problem: the user's input is
//! handed back together with the problem so they can correct it.

use kvm_topology::{RegistryError, ScreenEdit, ScreenId, ServerConfig};
use tracing::{debug, info, warn};

/// Why a submitted draft was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditProblem {
    /// The name field was left empty.
    EmptyName,
    /// The name also appears in the alias list.
    NameMatchesAlias,
    /// Another screen already uses this name or alias.
    NameConflict(String),
    /// A name or alias contains whitespace or characters reserved by the
    /// engine grammar.
    InvalidName(String),
}

impl std::fmt::Display for EditProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditProblem::EmptyName => f.write_str("the screen name must not be empty"),
            EditProblem::NameMatchesAlias => f.write_str("the screen name must not also be an alias"),
            EditProblem::NameConflict(name) => write!(f, "\"{name}\" is already used by another screen"),
            EditProblem::InvalidName(name) => write!(f, "\"{name}\" is not a valid screen name"),
        }
    }
}

/// How the edit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Cancelled,
}

/// The settings form shown to the user.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsForm {
    /// Shows `draft` (and `problem`, if the previous submission was refused)
    /// and blocks until the user confirms or cancels.
    ///
    /// Returns the edited values on confirm, `None` on cancel.
    fn show(&mut self, draft: &ScreenEdit, problem: Option<EditProblem>) -> Option<ScreenEdit>;
}

/// Runs the settings form for screen `id` until the user submits a valid
/// draft or cancels.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownScreen`] if `id` is not in `config`.
/// Validation problems are never returned; they are shown in the form.
pub fn edit_screen_settings(
    config: &mut ServerConfig,
    id: ScreenId,
    form: &mut dyn SettingsForm,
) -> Result<EditOutcome, RegistryError> {
    let screen = config
        .registry()
        .get(id)
        .ok_or(RegistryError::UnknownScreen(id))?;
    let mut draft = ScreenEdit::from_screen(screen);
    let mut problem = None;

    loop {
        let Some(edited) = form.show(&draft, problem.take()) else {
            debug!(%id, "screen settings edit cancelled");
            return Ok(EditOutcome::Cancelled);
        };

        match validate(config, id, &edited)? {
            None => {
                config.apply_screen_edit(id, &edited)?;
                info!(%id, name = %edited.name, "screen settings updated");
                return Ok(EditOutcome::Applied);
            }
            Some(found) => {
                warn!(%id, problem = %found, "screen settings refused");
                problem = Some(found);
                draft = edited;
            }
        }
    }
}

/// Returns the first problem with `edit`, or `None` if it can be applied.
fn validate(config: &ServerConfig, id: ScreenId, edit: &ScreenEdit) -> Result<Option<EditProblem>, RegistryError> {
    if edit.name.is_empty() {
        return Ok(Some(EditProblem::EmptyName));
    }
    if edit.aliases.contains(&edit.name) {
        return Ok(Some(EditProblem::NameMatchesAlias));
    }
    match config.registry().check_identity(id, &edit.name, &edit.aliases) {
        Ok(()) => Ok(None),
        Err(RegistryError::NameConflict(name)) => Ok(Some(EditProblem::NameConflict(name))),
        Err(RegistryError::InvalidName(name)) => Ok(Some(EditProblem::InvalidName(name))),
        // Only an empty alias can get here; the name was checked above.
        Err(RegistryError::EmptyName) => Ok(Some(EditProblem::InvalidName(String::new()))),
        Err(other) => Err(other),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kvm_topology::{ActionKind, Cell, HotkeyAction, KeyChord, ModifierKey};
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn config_with_two_screens() -> (ServerConfig, ScreenId, ScreenId) {
        let mut config = ServerConfig::new();
        let desk = config.add_screen("desk", Cell::new(0, 0)).unwrap();
        let laptop = config.add_screen("laptop", Cell::new(1, 0)).unwrap();
        (config, desk, laptop)
    }

    fn draft_of(config: &ServerConfig, id: ScreenId) -> ScreenEdit {
        ScreenEdit::from_screen(config.registry().get(id).unwrap())
    }

    #[test]
    fn test_confirm_valid_edit_applies_it() {
        // Arrange
        let (mut config, desk, _) = config_with_two_screens();
        let mut edited = draft_of(&config, desk);
        edited.name = "workstation".to_string();
        edited.aliases = vec!["ws.local".to_string()];
        edited.modifiers.alt = ModifierKey::Super;

        let mut form = MockSettingsForm::new();
        let submitted = edited.clone();
        form.expect_show()
            .with(eq(draft_of(&config, desk)), eq(None))
            .times(1)
            .returning(move |_, _| Some(submitted.clone()));

        // Act
        let outcome = edit_screen_settings(&mut config, desk, &mut form).unwrap();

        // Assert
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(draft_of(&config, desk), edited);
    }

    #[test]
    fn test_cancel_leaves_screen_unchanged() {
        let (mut config, desk, _) = config_with_two_screens();
        let before = config.clone();
        let mut form = MockSettingsForm::new();
        form.expect_show().times(1).returning(|_, _| None);

        let outcome = edit_screen_settings(&mut config, desk, &mut form).unwrap();

        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(config, before);
    }

    #[test]
    fn test_empty_name_is_reported_and_form_reshown() {
        // Arrange
        let (mut config, desk, _) = config_with_two_screens();
        let mut empty = draft_of(&config, desk);
        empty.name = String::new();
        let mut fixed = empty.clone();
        fixed.name = "office".to_string();

        let mut seq = Sequence::new();
        let mut form = MockSettingsForm::new();
        let first = empty.clone();
        form.expect_show()
            .with(eq(draft_of(&config, desk)), eq(None))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Some(first.clone()));
        let second = fixed.clone();
        form.expect_show()
            .with(eq(empty), eq(Some(EditProblem::EmptyName)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Some(second.clone()));

        // Act
        let outcome = edit_screen_settings(&mut config, desk, &mut form).unwrap();

        // Assert
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(config.registry().get(desk).unwrap().name, "office");
    }

    #[test]
    fn test_name_matching_alias_is_reported() {
        let (mut config, desk, _) = config_with_two_screens();
        let mut bad = draft_of(&config, desk);
        bad.aliases = vec!["desk".to_string()];

        let mut seq = Sequence::new();
        let mut form = MockSettingsForm::new();
        let first = bad.clone();
        form.expect_show()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Some(first.clone()));
        form.expect_show()
            .with(eq(bad), eq(Some(EditProblem::NameMatchesAlias)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| None);

        let outcome = edit_screen_settings(&mut config, desk, &mut form).unwrap();

        assert_eq!(outcome, EditOutcome::Cancelled);
        assert!(config.registry().get(desk).unwrap().settings.aliases.is_empty());
    }

    #[test]
    fn test_name_taken_by_other_screen_is_reported() {
        let (mut config, desk, _) = config_with_two_screens();
        let mut taken = draft_of(&config, desk);
        taken.name = "laptop".to_string();

        let mut seq = Sequence::new();
        let mut form = MockSettingsForm::new();
        form.expect_show()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Some(taken.clone()));
        form.expect_show()
            .withf(|_, problem| *problem == Some(EditProblem::NameConflict("laptop".to_string())))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| None);

        let outcome = edit_screen_settings(&mut config, desk, &mut form).unwrap();

        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(config.registry().get(desk).unwrap().name, "desk");
    }

    #[test]
    fn test_alias_taken_by_other_screen_is_reported() {
        let (mut config, desk, laptop) = config_with_two_screens();
        config.set_aliases(laptop, vec!["lap".to_string()]).unwrap();
        let mut taken = draft_of(&config, desk);
        taken.aliases = vec!["lap".to_string()];

        let mut seq = Sequence::new();
        let mut form = MockSettingsForm::new();
        form.expect_show()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Some(taken.clone()));
        form.expect_show()
            .withf(|_, problem| *problem == Some(EditProblem::NameConflict("lap".to_string())))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| None);

        edit_screen_settings(&mut config, desk, &mut form).unwrap();
    }

    #[test]
    fn test_invalid_alias_is_reported() {
        let (mut config, desk, _) = config_with_two_screens();
        let mut bad = draft_of(&config, desk);
        bad.aliases = vec!["has space".to_string()];

        let mut seq = Sequence::new();
        let mut form = MockSettingsForm::new();
        form.expect_show()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Some(bad.clone()));
        form.expect_show()
            .withf(|_, problem| *problem == Some(EditProblem::InvalidName("has space".to_string())))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| None);

        edit_screen_settings(&mut config, desk, &mut form).unwrap();
    }

    #[test]
    fn test_rename_retargets_hotkeys() {
        // Arrange
        let (mut config, desk, _) = config_with_two_screens();
        config
            .add_hotkey(HotkeyAction::new(
                KeyChord::parse("F5").unwrap(),
                ActionKind::SwitchToScreen { screen: "desk".to_string() },
            ))
            .unwrap();
        let mut renamed = draft_of(&config, desk);
        renamed.name = "tower".to_string();

        let mut form = MockSettingsForm::new();
        form.expect_show().times(1).returning(move |_, _| Some(renamed.clone()));

        // Act
        edit_screen_settings(&mut config, desk, &mut form).unwrap();

        // Assert
        assert_eq!(
            config.hotkeys()[0].kind,
            ActionKind::SwitchToScreen { screen: "tower".to_string() }
        );
    }

    #[test]
    fn test_unknown_screen_fails_without_showing_form() {
        let (mut config, desk, _) = config_with_two_screens();
        config.remove_screen(desk).unwrap();
        let mut form = MockSettingsForm::new();
        form.expect_show().never();

        let result = edit_screen_settings(&mut config, desk, &mut form);

        assert_eq!(result, Err(RegistryError::UnknownScreen(desk)));
    }
}
