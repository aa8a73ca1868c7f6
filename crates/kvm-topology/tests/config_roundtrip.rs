//! Integration tests for the engine configuration grammar.
//!
//! These tests drive the public API only: build a configuration through
//! [`ServerConfig`], export it, import the text back and compare.

use kvm_topology::{
    export, import, ActionKind, Cell, Direction, ExportError, HotkeyAction, ImportError, KeyChord,
    LockMode, ModifierKey, RegistryError, ServerConfig, Trigger,
};

fn chord(s: &str) -> KeyChord {
    KeyChord::parse(s).expect("valid chord")
}

/// Server in the middle with one client on each side and one below.
fn office() -> ServerConfig {
    let mut config = ServerConfig::new();
    let server = config.add_screen("server", Cell::new(2, 1)).unwrap();
    let left = config.add_screen("laptop", Cell::new(1, 1)).unwrap();
    config.add_screen("desk", Cell::new(3, 1)).unwrap();
    config.add_screen("tv", Cell::new(2, 2)).unwrap();

    config
        .set_aliases(server, vec!["server.local".to_string(), "10.0.0.1".to_string()])
        .unwrap();
    config.set_aliases(left, vec!["laptop.local".to_string()]).unwrap();

    let mut laptop = config.registry().get(left).unwrap().settings.clone();
    laptop.modifiers.ctrl = ModifierKey::Super;
    laptop.modifiers.super_key = ModifierKey::Ctrl;
    laptop.modifiers.alt = ModifierKey::None;
    laptop.dead_corners.top_left = true;
    laptop.dead_corners.bottom_right = true;
    laptop.dead_corners.size = 16;
    laptop.fixes.half_duplex_caps_lock = true;
    laptop.fixes.xtest_xinerama_unaware = true;
    config.set_modifiers(left, laptop.modifiers).unwrap();
    config.set_dead_corners(left, laptop.dead_corners).unwrap();
    config.set_fixes(left, laptop.fixes).unwrap();

    config.options.heartbeat_ms = Some(5000);
    config.options.switch_delay_ms = Some(250);
    config.options.clipboard_sharing = false;
    config.options.drag_drop_max_mib = 64;
    config.options.relative_mouse_moves = true;
    config.options.dead_corners.top_right = true;
    config.options.dead_corners.size = 4;
    config.options.ignore_auto_config_clients = true;
    config.options.disable_lock_to_screen = true;
    config.options.clipboard_sharing_size_kib = 1024;
    config.options.protocol = Some("barrier".to_string());
    config.options.client_address = Some("10.0.0.9".to_string());

    config
        .add_hotkey(HotkeyAction::new(
            chord("Control+Alt+D"),
            ActionKind::SwitchToScreen { screen: "desk".to_string() },
        ))
        .unwrap();
    config
        .add_hotkey(
            HotkeyAction::new(chord("ScrollLock"), ActionKind::LockCursorToScreen { mode: LockMode::Toggle })
                .with_trigger(Trigger::OnRelease)
                .with_scope(["laptop", "tv"]),
        )
        .unwrap();
    config
        .add_hotkey(
            HotkeyAction::new(
                chord("Control+Alt+Left"),
                ActionKind::SwitchInDirection { direction: Direction::Left },
            )
            .with_trigger(Trigger::Both),
        )
        .unwrap();
    config
        .add_hotkey(HotkeyAction::new(chord("Control+Alt+R"), ActionKind::RestartServer))
        .unwrap();
    config
}

// ── Round trip ────────────────────────────────────────────────────────────────

#[test]
fn test_round_trip_preserves_full_configuration() {
    // Arrange
    let original = office();

    // Act
    let document = export(&original).expect("connected layout must export");
    let restored = import(document.as_str()).expect("exported text must import");

    // Assert
    assert_eq!(restored, original);
}

#[test]
fn test_round_trip_single_screen() {
    let mut original = ServerConfig::new();
    original.add_screen("alone", Cell::new(-3, 7)).unwrap();

    let restored = import(export(&original).unwrap().as_str()).unwrap();

    assert_eq!(restored, original);
}

#[test]
fn test_round_trip_is_stable_across_repeated_exports() {
    let first = export(&office()).unwrap();
    let second = export(&import(first.as_str()).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_round_trip_keeps_default_options() {
    let mut original = ServerConfig::new();
    original.add_screen("a", Cell::new(0, 0)).unwrap();
    original.add_screen("b", Cell::new(0, 1)).unwrap();

    let restored = import(export(&original).unwrap().as_str()).unwrap();

    assert_eq!(restored.options, original.options);
    assert_eq!(restored.options.heartbeat_ms, None);
}

#[test]
fn test_grammar_keywords_cannot_become_aliases() {
    // Arrange
    let mut config = ServerConfig::new();
    let a = config.add_screen("A", Cell::new(0, 0)).unwrap();
    config.add_screen("B", Cell::new(1, 0)).unwrap();

    // Act
    let end = config.set_aliases(a, vec!["end".to_string()]);
    let section = config.add_screen("section", Cell::new(2, 0));
    config
        .set_aliases(a, vec!["ending".to_string(), "end.local".to_string()])
        .unwrap();
    let restored = import(export(&config).unwrap().as_str()).unwrap();

    // Assert
    assert_eq!(end, Err(RegistryError::InvalidName("end".to_string())));
    assert_eq!(section, Err(RegistryError::InvalidName("section".to_string())));
    assert_eq!(restored, config);
}

#[test]
fn test_import_rejects_keyword_alias_in_hand_written_document() {
    let text = "section: screens\n\tA:\nend\n\
                section: aliases\n\tA:\n\t\tsection\nend\n";

    let error = import(text).unwrap_err();

    assert!(
        matches!(
            &error,
            ImportError::Registry { source: RegistryError::InvalidName(name), .. } if name == "section"
        ),
        "{error:?}"
    );
}

// ── Adjacency scenario ────────────────────────────────────────────────────────

#[test]
fn test_two_screens_side_by_side_then_moved_apart() {
    // Arrange
    let mut config = ServerConfig::new();
    let s1 = config.add_screen("S1", Cell::new(0, 0)).unwrap();
    let s2 = config.add_screen("S2", Cell::new(1, 0)).unwrap();

    // Assert: adjacent and exportable
    let topology = config.topology();
    assert_eq!(topology.neighbor_of(s1, Direction::Right), Some(s2));
    assert_eq!(topology.neighbor_of(s2, Direction::Left), Some(s1));
    assert!(topology.is_connected());
    assert!(export(&config).is_ok());

    // Act
    config.move_screen(s2, Cell::new(5, 5)).unwrap();

    // Assert: no longer adjacent, export refused
    let topology = config.topology();
    assert_eq!(topology.neighbor_of(s1, Direction::Right), None);
    assert!(!topology.is_connected());
    assert_eq!(export(&config), Err(ExportError::Disconnected { components: 2 }));
}

// ── Import of hand-written documents ──────────────────────────────────────────

#[test]
fn test_import_hand_written_document_without_cells() {
    let text = "\
# written by hand
section: screens
    server:
        switchCorners = none
    client:
        shift = shift
end

section: links
    server:
        up = client   # client sits above the server
end

section: options
    screenSaverSync = false
    keystroke(Super+Up) = switchToScreen(client)
end
";

    let config = import(text).expect("valid hand-written document");

    let server = config.registry().find_by_name("server").unwrap();
    let client = config.registry().find_by_name("client").unwrap();
    assert_eq!(server.cell, Cell::new(0, 0));
    assert_eq!(client.cell, Cell::new(0, -1));
    assert_eq!(
        config.topology().neighbor_of(client.id, Direction::Down),
        Some(server.id)
    );
    assert!(!config.options.screensaver_sync);
    assert_eq!(config.hotkeys().len(), 1);
}

#[test]
fn test_import_rejects_inconsistent_links_without_partial_result() {
    let text = "\
section: screens
    a:
    b:
    c:
end
section: links
    a:
        right = b
    b:
        left = c
end
";

    let result = import(text);

    assert!(matches!(result, Err(ImportError::MalformedLink { .. })));
}
