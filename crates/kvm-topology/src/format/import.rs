//! Reads the engine grammar back into a [`ServerConfig`].
//!
//! Import runs in two passes.  The first reads every statement into plain
//! declarations and rejects grammar errors.  The second resolves names,
//! checks that the links are symmetric, works out a grid cell for every
//! screen and only then builds the configuration, so a rejected document never
//! yields a partially filled one.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use super::lexer::{self, parse_bool, Line, Statement};
use super::{ImportError, CELL_DIRECTIVE, IGNORE_AUTO_CONFIG_DIRECTIVE};
use crate::domain::config::ServerConfig;
use crate::domain::grid::{Cell, Direction};
use crate::domain::hotkey::{ActionKind, HotkeyAction, KeyChord, LockMode, Trigger};
use crate::domain::options::GlobalOptions;
use crate::domain::registry::{RegistryError, ScreenRegistry};
use crate::domain::screen::{Corner, DeadCorners, ModifierKey, ModifierRemap, ScreenId, ScreenSettings};

/// Parses a document into a [`ServerConfig`].
///
/// Screens keep the cells recorded in their `#@cell` directives when every
/// screen has one.  Otherwise the layout is rebuilt from the links: the first
/// declared screen goes to (0,0), and each further group of linked screens is
/// placed to the right of the previous ones, one empty column apart.
///
/// A link whose reverse is missing is accepted, since adjacency is derived
/// from cells anyway.
///
/// Adjacency always comes from the cells, never from the link list.  Two
/// screens whose `#@cell` directives put them side by side are linked after
/// import even if the document declares no link between them, although the
/// engine would have treated that undeclared side as a wall.  Exporting the
/// result writes the link, so a reload can add edges but never drops one.
///
/// # Errors
///
/// See [`ImportError`].  Nothing is returned on error; the caller decides what
/// to fall back to.
pub fn import(text: &str) -> Result<ServerConfig, ImportError> {
    Declarations::read(text)?.build()
}

fn syntax(line: usize, message: impl Into<String>) -> ImportError {
    ImportError::Syntax {
        line,
        message: message.into(),
    }
}

fn malformed(line: usize, reason: String) -> ImportError {
    ImportError::MalformedLink { line, reason }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Screens,
    Aliases,
    Links,
    Options,
}

impl Section {
    fn from_name(name: &str) -> Option<Section> {
        match name {
            "screens" => Some(Section::Screens),
            "aliases" => Some(Section::Aliases),
            "links" => Some(Section::Links),
            "options" => Some(Section::Options),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Section::Screens => "screens",
            Section::Aliases => "aliases",
            Section::Links => "links",
            Section::Options => "options",
        }
    }
}

#[derive(Debug)]
struct DeclaredScreen {
    name: String,
    line: usize,
    cell: Option<Cell>,
    settings: ScreenSettings,
}

#[derive(Debug)]
struct DeclaredAlias {
    line: usize,
    screen: String,
    alias: String,
}

#[derive(Debug)]
struct DeclaredLink {
    line: usize,
    from: String,
    direction: Direction,
    to: String,
}

/// An action as written in a keystroke line, before its trigger is known.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Command {
    kind: ActionKind,
    scope: Vec<String>,
}

/// Link target and declaring line for each direction of one screen.
type LinkSlots = [Option<(usize, usize)>; 4];

// ── Pass 1: read ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Declarations {
    screens: Vec<DeclaredScreen>,
    /// `<name>:` block headers in the aliases and links sections.
    headers: Vec<(usize, String)>,
    aliases: Vec<DeclaredAlias>,
    links: Vec<DeclaredLink>,
    options: GlobalOptions,
    hotkeys: Vec<(usize, HotkeyAction)>,
}

impl Declarations {
    fn read(text: &str) -> Result<Self, ImportError> {
        let mut decl = Declarations::default();
        let mut open: Option<(Section, usize)> = None;
        let mut block: Option<String> = None;

        for Line { number, statement } in lexer::lines(text) {
            let Some((section, _)) = open else {
                match statement {
                    Statement::SectionStart(name) => {
                        let section = Section::from_name(name)
                            .ok_or_else(|| syntax(number, format!("unknown section \"{name}\"")))?;
                        open = Some((section, number));
                        block = None;
                    }
                    // Editor directives outside a section are plain comments.
                    Statement::Directive { .. } => {}
                    _ => return Err(syntax(number, "statement outside of a section")),
                }
                continue;
            };

            match statement {
                Statement::SectionStart(name) => {
                    return Err(syntax(
                        number,
                        format!(
                            "section \"{name}\" starts before section \"{}\" is closed with end",
                            section.name()
                        ),
                    ))
                }
                Statement::End => open = None,
                _ => decl.read_statement(section, &mut block, number, statement)?,
            }
        }

        if let Some((section, line)) = open {
            return Err(syntax(
                line,
                format!("section \"{}\" is missing its end", section.name()),
            ));
        }
        Ok(decl)
    }

    fn read_statement(
        &mut self,
        section: Section,
        block: &mut Option<String>,
        line: usize,
        statement: Statement<'_>,
    ) -> Result<(), ImportError> {
        match (section, statement) {
            (_, Statement::Directive { key, value }) => {
                self.read_directive(section, block.is_some(), line, key, value)
            }
            (Section::Options, Statement::Assign { key, value }) => self.read_option(line, key, value),
            (Section::Screens, Statement::Header(name)) => {
                self.screens.push(DeclaredScreen {
                    name: name.to_string(),
                    line,
                    cell: None,
                    settings: ScreenSettings::default(),
                });
                *block = Some(name.to_string());
                Ok(())
            }
            (Section::Aliases | Section::Links, Statement::Header(name)) => {
                self.headers.push((line, name.to_string()));
                *block = Some(name.to_string());
                Ok(())
            }
            (Section::Screens, Statement::Assign { key, value }) => {
                let screen = self.current_screen(block.is_some(), line)?;
                read_screen_option(&mut screen.settings, line, key, value)
            }
            (Section::Aliases, Statement::Word(alias)) => {
                let screen = block
                    .clone()
                    .ok_or_else(|| syntax(line, "alias before any screen name"))?;
                self.aliases.push(DeclaredAlias {
                    line,
                    screen,
                    alias: alias.to_string(),
                });
                Ok(())
            }
            (Section::Links, Statement::Assign { key, value }) => {
                let from = block
                    .clone()
                    .ok_or_else(|| syntax(line, "link before any screen name"))?;
                let direction = Direction::from_keyword(key)
                    .ok_or_else(|| syntax(line, format!("unknown link direction \"{key}\"")))?;
                self.links.push(DeclaredLink {
                    line,
                    from,
                    direction,
                    to: value.to_string(),
                });
                Ok(())
            }
            _ => Err(syntax(
                line,
                format!("unexpected statement in section \"{}\"", section.name()),
            )),
        }
    }

    fn read_directive(
        &mut self,
        section: Section,
        in_block: bool,
        line: usize,
        key: &str,
        value: &str,
    ) -> Result<(), ImportError> {
        match (section, key) {
            (Section::Screens, CELL_DIRECTIVE) => {
                let cell = parse_cell(value)
                    .ok_or_else(|| syntax(line, format!("invalid cell \"{value}\"")))?;
                let screen = self.current_screen(in_block, line)?;
                if screen.cell.is_some() {
                    return Err(syntax(line, format!("screen \"{}\" has two cells", screen.name)));
                }
                screen.cell = Some(cell);
                Ok(())
            }
            (Section::Options, IGNORE_AUTO_CONFIG_DIRECTIVE) => {
                self.options.ignore_auto_config_clients = bool_value(line, key, value)?;
                Ok(())
            }
            // Unknown directives are comments to us as well.
            _ => Ok(()),
        }
    }

    fn current_screen(&mut self, in_block: bool, line: usize) -> Result<&mut DeclaredScreen, ImportError> {
        match self.screens.last_mut() {
            Some(screen) if in_block => Ok(screen),
            _ => Err(syntax(line, "screen option before any screen name")),
        }
    }

    fn read_option(&mut self, line: usize, key: &str, value: &str) -> Result<(), ImportError> {
        if let Some(rest) = key.strip_prefix("keystroke(") {
            return self.read_keystroke(line, rest, value);
        }

        let options = &mut self.options;
        match key {
            "heartbeat" => options.heartbeat_ms = Some(number(line, key, value)?),
            "relativeMouseMoves" => options.relative_mouse_moves = bool_value(line, key, value)?,
            "screenSaverSync" => options.screensaver_sync = bool_value(line, key, value)?,
            "win32KeepForeground" => options.win32_keep_foreground = bool_value(line, key, value)?,
            "clipboardSharing" => options.clipboard_sharing = bool_value(line, key, value)?,
            "clipboardSharingSize" => options.clipboard_sharing_size_kib = number(line, key, value)?,
            "disableLockToScreen" => options.disable_lock_to_screen = bool_value(line, key, value)?,
            "protocol" => options.protocol = Some(text_value(line, key, value)?),
            "clientAddress" => options.client_address = Some(text_value(line, key, value)?),
            "enableDragDrop" => options.drag_and_drop = bool_value(line, key, value)?,
            "dragDropMaxSize" => options.drag_drop_max_mib = number(line, key, value)?,
            "switchDelay" => options.switch_delay_ms = Some(number(line, key, value)?),
            "switchDoubleTap" => options.switch_double_tap_ms = Some(number(line, key, value)?),
            "switchCorners" => read_corners(&mut options.dead_corners, line, value)?,
            "switchCornerSize" => options.dead_corners.size = number(line, key, value)?,
            _ => return Err(syntax(line, format!("unknown option \"{key}\""))),
        }
        Ok(())
    }

    /// `keystroke(<chord>) = <press actions> [; <release actions>]`
    ///
    /// An action listed on both sides becomes a single [`Trigger::Both`] action.
    fn read_keystroke(&mut self, line: usize, rest: &str, value: &str) -> Result<(), ImportError> {
        let chord = rest
            .strip_suffix(')')
            .ok_or_else(|| syntax(line, "keystroke chord is missing its closing parenthesis"))?;
        let chord = KeyChord::parse(chord).map_err(|e| syntax(line, e.to_string()))?;

        let (press, release) = value.split_once(';').unwrap_or((value, ""));
        if release.contains(';') {
            return Err(syntax(line, "a keystroke takes at most one ';'"));
        }
        let press = parse_commands(line, press)?;
        let mut release = parse_commands(line, release)?;
        if press.is_empty() && release.is_empty() {
            return Err(syntax(line, format!("keystroke({chord}) has no actions")));
        }

        for command in press {
            let trigger = match release.iter().position(|r| *r == command) {
                Some(index) => {
                    release.remove(index);
                    Trigger::Both
                }
                None => Trigger::OnPress,
            };
            self.hotkeys.push((line, command.into_action(chord.clone(), trigger)));
        }
        for command in release {
            self.hotkeys
                .push((line, command.into_action(chord.clone(), Trigger::OnRelease)));
        }
        Ok(())
    }
}

impl Command {
    fn into_action(self, chord: KeyChord, trigger: Trigger) -> HotkeyAction {
        HotkeyAction {
            chord,
            kind: self.kind,
            trigger,
            scope: self.scope,
        }
    }
}

fn read_screen_option(
    settings: &mut ScreenSettings,
    line: usize,
    key: &str,
    value: &str,
) -> Result<(), ImportError> {
    if ModifierRemap::SOURCES.contains(&key) {
        let target = ModifierKey::from_keyword(value)
            .ok_or_else(|| syntax(line, format!("unknown modifier \"{value}\"")))?;
        settings.modifiers.set(key, target);
        return Ok(());
    }
    match key {
        "switchCorners" => read_corners(&mut settings.dead_corners, line, value),
        "switchCornerSize" => {
            settings.dead_corners.size = number(line, key, value)?;
            Ok(())
        }
        _ if settings.fixes.entries().iter().any(|(k, _)| *k == key) => {
            let enabled = bool_value(line, key, value)?;
            settings.fixes.set(key, enabled);
            Ok(())
        }
        _ => Err(syntax(line, format!("unknown screen option \"{key}\""))),
    }
}

/// Applies `none +top-left -bottom-right ...` to `corners`, keeping the size.
///
/// An unsigned first word replaces the current set; later unsigned words add.
fn read_corners(corners: &mut DeadCorners, line: usize, value: &str) -> Result<(), ImportError> {
    if value.is_empty() {
        return Err(syntax(line, "switchCorners needs a value"));
    }
    for (i, word) in value.split_whitespace().enumerate() {
        let (enabled, name, signed) = if let Some(name) = word.strip_prefix('+') {
            (true, name, true)
        } else if let Some(name) = word.strip_prefix('-') {
            (false, name, true)
        } else {
            (true, word, false)
        };
        let group =
            corner_group(name).ok_or_else(|| syntax(line, format!("unknown corner \"{name}\"")))?;
        if i == 0 && !signed {
            *corners = DeadCorners {
                size: corners.size,
                ..DeadCorners::default()
            };
        }
        for corner in group {
            corners.set(*corner, enabled);
        }
    }
    Ok(())
}

fn corner_group(name: &str) -> Option<&'static [Corner]> {
    use Corner::{BottomLeft, BottomRight, TopLeft, TopRight};
    let group: &'static [Corner] = match name {
        "none" => &[],
        "all" => &Corner::ALL,
        "left" => &[TopLeft, BottomLeft],
        "right" => &[TopRight, BottomRight],
        "top" => &[TopLeft, TopRight],
        "bottom" => &[BottomLeft, BottomRight],
        "top-left" => &[TopLeft],
        "top-right" => &[TopRight],
        "bottom-left" => &[BottomLeft],
        "bottom-right" => &[BottomRight],
        _ => return None,
    };
    Some(group)
}

fn parse_commands(line: usize, text: &str) -> Result<Vec<Command>, ImportError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(text)
        .into_iter()
        .map(|part| parse_command(line, part))
        .collect()
}

/// Splits on commas that are not inside parentheses.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

fn parse_command(line: usize, text: &str) -> Result<Command, ImportError> {
    let (name, args) = text
        .strip_suffix(')')
        .and_then(|t| t.split_once('('))
        .ok_or_else(|| syntax(line, format!("malformed action \"{text}\"")))?;
    let (argument, scope) = match args.split_once(',') {
        Some((argument, scope)) => (argument.trim(), parse_scope(line, scope.trim())?),
        None => (args.trim(), Vec::new()),
    };

    let kind = match name.trim() {
        "switchToScreen" if !argument.is_empty() => ActionKind::SwitchToScreen {
            screen: argument.to_string(),
        },
        "switchInDirection" => ActionKind::SwitchInDirection {
            direction: Direction::from_keyword(argument)
                .ok_or_else(|| syntax(line, format!("unknown direction \"{argument}\"")))?,
        },
        "lockCursorToScreen" if argument.is_empty() => ActionKind::LockCursorToScreen {
            mode: LockMode::Toggle,
        },
        "lockCursorToScreen" => ActionKind::LockCursorToScreen {
            mode: LockMode::from_keyword(argument)
                .ok_or_else(|| syntax(line, format!("unknown lock mode \"{argument}\"")))?,
        },
        "restartServer" if argument.is_empty() || argument == "restart" => ActionKind::RestartServer,
        _ => return Err(syntax(line, format!("unsupported action \"{text}\""))),
    };
    Ok(Command { kind, scope })
}

/// `*` means every screen; otherwise a `:`-separated list of names.
fn parse_scope(line: usize, scope: &str) -> Result<Vec<String>, ImportError> {
    if scope == "*" {
        return Ok(Vec::new());
    }
    scope
        .split(':')
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(syntax(line, format!("empty screen name in scope \"{scope}\"")))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

fn parse_cell(value: &str) -> Option<Cell> {
    let (column, row) = value.split_once(',')?;
    Some(Cell::new(column.trim().parse().ok()?, row.trim().parse().ok()?))
}

fn bool_value(line: usize, key: &str, value: &str) -> Result<bool, ImportError> {
    parse_bool(value)
        .ok_or_else(|| syntax(line, format!("\"{key}\" expects true or false, got \"{value}\"")))
}

fn text_value(line: usize, key: &str, value: &str) -> Result<String, ImportError> {
    if value.is_empty() {
        return Err(syntax(line, format!("\"{key}\" expects a value")));
    }
    Ok(value.to_string())
}

fn number(line: usize, key: &str, value: &str) -> Result<u32, ImportError> {
    value.parse().map_err(|_| {
        syntax(
            line,
            format!("\"{key}\" expects a non-negative integer, got \"{value}\""),
        )
    })
}

// ── Pass 2: resolve and build ─────────────────────────────────────────────────

impl Declarations {
    fn build(self) -> Result<ServerConfig, ImportError> {
        // Names and aliases go through a scratch registry first so that every
        // uniqueness rule is checked before any cell is known.
        let mut names = ScreenRegistry::new();
        let mut ids: Vec<ScreenId> = Vec::with_capacity(self.screens.len());
        for (i, screen) in self.screens.iter().enumerate() {
            let id = names
                .add(screen.name.clone(), Cell::new(i as i32, 0))
                .map_err(|source| ImportError::Registry {
                    line: screen.line,
                    source,
                })?;
            ids.push(id);
        }
        for (line, header) in &self.headers {
            if names.resolve_name(header).is_none() {
                return Err(ImportError::UnknownScreen {
                    line: *line,
                    name: header.clone(),
                });
            }
        }
        for entry in &self.aliases {
            let screen = names.find_by_name(&entry.screen).ok_or_else(|| ImportError::UnknownScreen {
                line: entry.line,
                name: entry.screen.clone(),
            })?;
            let id = screen.id;
            let mut aliases = screen.settings.aliases.clone();
            aliases.push(entry.alias.clone());
            names
                .set_aliases(id, aliases)
                .map_err(|source| ImportError::Registry {
                    line: entry.line,
                    source,
                })?;
        }

        let index_of: HashMap<ScreenId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let resolve = |name: &str| {
            names
                .resolve_name(name)
                .and_then(|id| index_of.get(&id).copied())
        };

        let slots = self.link_slots(resolve)?;
        let cells = self.layout(&slots)?;

        let declared_links = slots.iter().flatten().flatten().count();
        let mut config = ServerConfig::new();
        config.options = self.options;
        for ((screen, cell), id) in self.screens.into_iter().zip(cells).zip(&ids) {
            let mut settings = screen.settings;
            settings.aliases = names
                .get(*id)
                .map(|s| s.settings.aliases.clone())
                .unwrap_or_default();
            config
                .insert_screen(screen.name, cell, settings)
                .map_err(|source| ImportError::Registry {
                    line: screen.line,
                    source,
                })?;
        }
        for (line, action) in self.hotkeys {
            config.add_hotkey(action).map_err(|e| match e {
                RegistryError::UnknownScreenName(name) => ImportError::UnknownScreen { line, name },
                source => ImportError::Registry { line, source },
            })?;
        }

        let derived_links = config.topology().links().len();
        if derived_links > declared_links {
            warn!(
                declared_links,
                derived_links, "neighboring screens without a declared link are linked"
            );
        }
        debug!(
            screens = config.registry().len(),
            hotkeys = config.hotkeys().len(),
            "configuration imported"
        );
        Ok(config)
    }

    /// Resolves every link to screen indices and checks it for consistency.
    ///
    /// A missing reverse link is filled in.  A repeated side, a self link or a
    /// reverse link pointing at a third screen is rejected.
    fn link_slots(&self, resolve: impl Fn(&str) -> Option<usize>) -> Result<Vec<LinkSlots>, ImportError> {
        let mut slots: Vec<LinkSlots> = vec![[None; 4]; self.screens.len()];
        for link in &self.links {
            let from = resolve(&link.from).ok_or_else(|| ImportError::UnknownScreen {
                line: link.line,
                name: link.from.clone(),
            })?;
            let to = resolve(&link.to).ok_or_else(|| {
                malformed(link.line, format!("\"{}\" is not a declared screen", link.to))
            })?;
            if from == to {
                return Err(malformed(
                    link.line,
                    format!("\"{}\" links to itself", self.screens[from].name),
                ));
            }
            let slot = &mut slots[from][link.direction.index()];
            if slot.is_some() {
                return Err(malformed(
                    link.line,
                    format!(
                        "\"{}\" has more than one {} link",
                        self.screens[from].name, link.direction
                    ),
                ));
            }
            *slot = Some((to, link.line));
        }

        for a in 0..slots.len() {
            for direction in Direction::ALL {
                let Some((b, line)) = slots[a][direction.index()] else {
                    continue;
                };
                let reverse = &mut slots[b][direction.opposite().index()];
                match *reverse {
                    Some((c, _)) if c != a => {
                        return Err(malformed(
                            line,
                            format!(
                                "\"{}\" {} = \"{}\", but \"{}\" {} = \"{}\"",
                                self.screens[a].name,
                                direction,
                                self.screens[b].name,
                                self.screens[b].name,
                                direction.opposite(),
                                self.screens[c].name
                            ),
                        ))
                    }
                    Some(_) => {}
                    None => *reverse = Some((a, line)),
                }
            }
        }
        Ok(slots)
    }

    /// Chooses a cell for every screen.
    fn layout(&self, slots: &[LinkSlots]) -> Result<Vec<Cell>, ImportError> {
        let hinted: Vec<Cell> = self.screens.iter().filter_map(|s| s.cell).collect();
        if !hinted.is_empty() && hinted.len() == self.screens.len() {
            self.check_hinted_cells(&hinted, slots)?;
            return Ok(hinted);
        }
        if !hinted.is_empty() {
            warn!(
                hinted = hinted.len(),
                screens = self.screens.len(),
                "only some screens carry a cell; rebuilding the layout from links"
            );
        }
        self.derive_cells(slots)
    }

    fn check_hinted_cells(&self, cells: &[Cell], slots: &[LinkSlots]) -> Result<(), ImportError> {
        for (a, screen_slots) in slots.iter().enumerate() {
            for direction in Direction::ALL {
                let Some((b, line)) = screen_slots[direction.index()] else {
                    continue;
                };
                if cells[a].step(direction) != Some(cells[b]) {
                    return Err(malformed(
                        line,
                        format!(
                            "\"{}\" at {} cannot have \"{}\" at {} as its {} neighbor",
                            self.screens[a].name, cells[a], self.screens[b].name, cells[b], direction
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Lays each group of linked screens out breadth-first.
    fn derive_cells(&self, slots: &[LinkSlots]) -> Result<Vec<Cell>, ImportError> {
        let mut cells: Vec<Option<Cell>> = vec![None; slots.len()];
        let mut next_column: Option<i32> = None;

        for start in 0..slots.len() {
            if cells[start].is_some() {
                continue;
            }

            let mut occupied: HashMap<Cell, usize> = HashMap::from([(Cell::new(0, 0), start)]);
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            cells[start] = Some(Cell::new(0, 0));

            while let Some(a) = queue.pop_front() {
                let Some(here) = cells[a] else { continue };
                for direction in Direction::ALL {
                    let Some((b, line)) = slots[a][direction.index()] else {
                        continue;
                    };
                    let Some(wanted) = here.step(direction) else {
                        return Err(malformed(
                            line,
                            format!("\"{}\" {} runs off the edge of the grid", self.screens[a].name, direction),
                        ));
                    };
                    match cells[b] {
                        Some(at) if at == wanted => {}
                        Some(_) => {
                            return Err(malformed(
                                line,
                                format!(
                                    "\"{}\" cannot be {} of \"{}\" and keep its other links",
                                    self.screens[b].name, direction, self.screens[a].name
                                ),
                            ))
                        }
                        None => {
                            if let Some(&other) = occupied.get(&wanted) {
                                return Err(malformed(
                                    line,
                                    format!(
                                        "\"{}\" {} = \"{}\" puts it where \"{}\" already is",
                                        self.screens[a].name,
                                        direction,
                                        self.screens[b].name,
                                        self.screens[other].name
                                    ),
                                ));
                            }
                            occupied.insert(wanted, b);
                            cells[b] = Some(wanted);
                            component.push(b);
                            queue.push_back(b);
                        }
                    }
                }
            }

            // The first group stays anchored at (0,0); later ones shift right.
            let columns = occupied.keys().map(|c| c.column);
            let (min_column, max_column) = columns.fold((i32::MAX, i32::MIN), |(lo, hi), c| {
                (lo.min(c), hi.max(c))
            });
            let shift = next_column.map_or(0, |column| column - min_column);
            for index in component {
                if let Some(cell) = cells[index].as_mut() {
                    cell.column += shift;
                }
            }
            next_column = Some(max_column + shift + 2);
        }

        Ok(cells.into_iter().flatten().collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
