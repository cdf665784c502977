use std::time::{Duration, Instant};

use shortcutdr::engine::catalog::ShortcutCatalog;
use shortcutdr::engine::index::ShortcutIndex;
use shortcutdr::engine::matcher::{MatchEngine, MatchOutcome};
use shortcutdr::engine::shortcut::ShortcutRecord;
use shortcutdr::keyboard::platform::Os;
use shortcutdr::keyboard::token::{CanonicalToken, KeyContext};
use shortcutdr::session::history::ComboHistory;
use shortcutdr::session::visualizer::Visualizer;

fn ctx(os: Os) -> KeyContext {
    KeyContext::new(os, Default::default())
}

fn visualizer(index: ShortcutIndex, os: Os) -> Visualizer {
    Visualizer::new(index, MatchEngine::default(), ComboHistory::new(10), ctx(os))
}

fn editor() -> Visualizer {
    let index = ShortcutIndex::from_records(
        "editor",
        Os::Windows,
        vec![
            ShortcutRecord::simple("editor", "Ctrl+C", "Copy"),
            ShortcutRecord::simple("editor", "Ctrl+V", "Paste"),
            ShortcutRecord::simple("editor", "Alt+F4", "Close"),
        ],
    );
    visualizer(index, Os::Windows)
}

fn bundled(id: &str, os: Os) -> Visualizer {
    let index = ShortcutCatalog::bundled(id).unwrap().index(id, os);
    visualizer(index, os)
}

#[test]
fn copy_is_recognized() {
    let mut vis = editor();
    let t = Instant::now();
    vis.key_down("ControlLeft", t);
    vis.key_down("KeyC", t);
    let view = vis.view();
    assert_eq!(view.combo.as_str(), "Ctrl+C");
    assert_eq!(view.matched.as_ref().unwrap().description, "Copy");
}

#[test]
fn held_modifier_lists_its_shortcuts() {
    let mut vis = editor();
    vis.key_down("ControlRight", Instant::now());
    let names: Vec<&str> = vis
        .view()
        .available
        .iter()
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(names, vec!["Copy", "Paste"]);
    assert!(vis.view().matched.is_none());
}

#[test]
fn left_and_right_modifiers_are_the_same_key() {
    let mut vis = editor();
    let t = Instant::now();
    vis.key_down("ControlLeft", t);
    vis.key_down("ControlRight", t);
    vis.key_down("KeyV", t);
    assert_eq!(vis.view().combo.as_str(), "Ctrl+V");
    assert_eq!(vis.view().pressed.len(), 2);
}

#[test]
fn focus_loss_recovers_cleanly() {
    let mut vis = editor();
    let t = Instant::now();
    vis.key_down("ControlLeft", t);
    vis.blur();
    // The release of Ctrl was never seen; the next press starts fresh.
    vis.key_down("KeyC", t + Duration::from_millis(10));
    assert_eq!(vis.view().combo.as_str(), "C");
    assert!(vis.view().matched.is_none());
}

#[test]
fn history_keeps_most_recent_first() {
    let mut vis = editor();
    let t = Instant::now();
    for key in ["KeyC", "KeyV", "KeyC"] {
        vis.key_down("ControlLeft", t);
        vis.key_down(key, t);
        vis.key_up(key, t);
        vis.key_up("ControlLeft", t);
    }
    let combos: Vec<&str> = vis.history().iter().map(|e| e.combo.as_str()).collect();
    assert_eq!(combos, vec!["Ctrl+C", "Ctrl+V", "Ctrl+C"]);
}

#[test]
fn gmail_go_to_inbox_sequence() {
    let mut vis = bundled("gmail", Os::Linux);
    let t = Instant::now();
    vis.key_down("KeyG", t);
    vis.key_up("KeyG", t + Duration::from_millis(50));
    vis.key_down("KeyI", t + Duration::from_millis(200));
    assert_eq!(
        vis.view().matched.as_ref().unwrap().description,
        "Go to inbox"
    );
}

#[test]
fn slow_sequence_does_not_match() {
    let mut vis = bundled("gmail", Os::Linux);
    let t = Instant::now();
    vis.key_down("KeyG", t);
    vis.key_up("KeyG", t);
    vis.tick(t + Duration::from_secs(3));
    vis.key_down("KeyI", t + Duration::from_secs(3));
    assert!(vis.view().matched.is_none());
}

#[test]
fn macos_catalog_uses_command_key() {
    let mut vis = bundled("chrome", Os::Macos);
    let t = Instant::now();
    vis.key_down("MetaLeft", t);
    vis.key_down("KeyT", t);
    assert_eq!(
        vis.view().matched.as_ref().unwrap().description,
        "Open a new tab"
    );
}

#[test]
fn gmail_select_all_with_shift_released_between_steps() {
    let mut vis = bundled("gmail", Os::Windows);
    let t = Instant::now();
    vis.key_down("ShiftLeft", t);
    vis.key_down("Digit8", t + Duration::from_millis(20));
    vis.key_up("Digit8", t + Duration::from_millis(80));
    vis.key_up("ShiftLeft", t + Duration::from_millis(120));
    vis.key_down("KeyA", t + Duration::from_millis(300));
    assert_eq!(
        vis.view().matched.as_ref().unwrap().description,
        "Select all conversations"
    );
}

#[test]
fn every_bundled_shortcut_is_reachable() {
    for id in ShortcutCatalog::available() {
        let catalog = ShortcutCatalog::bundled(&id).unwrap();
        for &os in Os::all() {
            let index = catalog.index(&id, os);
            for record in index.records() {
                let modifiers: Vec<CanonicalToken> =
                    record.combo.modifiers().into_iter().map(CanonicalToken::new).collect();
                let mains: Vec<CanonicalToken> =
                    record.combo.main_keys().into_iter().map(CanonicalToken::new).collect();

                if record.is_sequential() {
                    let mut engine = MatchEngine::default();
                    let t = Instant::now();
                    let mut hit = None;
                    for (step, key) in mains.iter().enumerate() {
                        let mut held = if step == 0 { modifiers.clone() } else { Vec::new() };
                        held.push(key.clone());
                        hit = engine.step(&index, key, &held, t);
                    }
                    assert_eq!(
                        hit.map(|r| &r.combo),
                        Some(&record.combo),
                        "{id} on {os:?}: sequence {} not matched",
                        record.combo
                    );
                } else {
                    let mut held = modifiers;
                    held.extend(mains);
                    match MatchEngine::default().lookup(&index, &held) {
                        MatchOutcome::Exact(found) => assert_eq!(
                            found.combo, record.combo,
                            "{id} on {os:?}: {} matched the wrong record",
                            record.combo
                        ),
                        other => panic!("{id} on {os:?}: {} not matched: {other:?}", record.combo),
                    }
                }
            }
        }
    }
}
