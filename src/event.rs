use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

use crate::keyboard::layout::KeyboardLayout;

pub enum AppEvent {
    Key(KeyEvent),
    /// Terminal lost focus; held keys can no longer be trusted.
    FocusLost,
    FocusGained,
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
                        Ok(Event::FocusLost) => Some(AppEvent::FocusLost),
                        Ok(Event::FocusGained) => Some(AppEvent::FocusGained),
                        Ok(Event::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                        _ => None,
                    };
                    if let Some(ev) = forwarded {
                        if tx.send(ev).is_err() {
                            return;
                        }
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

// Shifted US symbols and the unshifted key that produces them.
const SHIFTED_SYMBOLS: [(char, char); 21] = [
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('~', '`'),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

fn unshifted(ch: char) -> (char, bool) {
    if ch.is_ascii_uppercase() {
        return (ch.to_ascii_lowercase(), true);
    }
    SHIFTED_SYMBOLS
        .iter()
        .find(|(shifted, _)| *shifted == ch)
        .map_or((ch, false), |&(_, base)| (base, true))
}

fn char_code(ch: char, layout: &KeyboardLayout) -> Option<String> {
    if ch == ' ' {
        return Some("Space".to_string());
    }
    let base = layout.position_of(ch).unwrap_or(ch);
    let code = match base {
        'a'..='z' => format!("Key{}", base.to_ascii_uppercase()),
        '0'..='9' => format!("Digit{base}"),
        '-' => "Minus".to_string(),
        '=' => "Equal".to_string(),
        '[' => "BracketLeft".to_string(),
        ']' => "BracketRight".to_string(),
        '\\' => "Backslash".to_string(),
        ';' => "Semicolon".to_string(),
        '\'' => "Quote".to_string(),
        '`' => "Backquote".to_string(),
        ',' => "Comma".to_string(),
        '.' => "Period".to_string(),
        '/' => "Slash".to_string(),
        _ => return None,
    };
    Some(code)
}

fn modifier_code(code: ModifierKeyCode) -> Option<&'static str> {
    let name = match code {
        ModifierKeyCode::LeftControl => "ControlLeft",
        ModifierKeyCode::RightControl => "ControlRight",
        ModifierKeyCode::LeftShift => "ShiftLeft",
        ModifierKeyCode::RightShift => "ShiftRight",
        ModifierKeyCode::LeftAlt => "AltLeft",
        ModifierKeyCode::RightAlt | ModifierKeyCode::IsoLevel3Shift => "AltRight",
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => "MetaLeft",
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => "MetaRight",
        _ => return None,
    };
    Some(name)
}

/// Physical key code (`KeyA`, `ControlLeft`, `ArrowUp`) for a terminal key.
///
/// Terminals report the character the active layout produced, so letters and
/// punctuation are mapped back to the QWERTY position that produced them.
/// Shifted symbols map to their unshifted key.
pub fn physical_code(code: KeyCode, layout: &KeyboardLayout) -> Option<String> {
    let name = match code {
        KeyCode::Char(ch) => return char_code(unshifted(ch).0, layout),
        KeyCode::F(n) => return Some(format!("F{n}")),
        KeyCode::Modifier(m) => return modifier_code(m).map(str::to_string),
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab | KeyCode::BackTab => "Tab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Esc => "Escape",
        KeyCode::PrintScreen => "PrintScreen",
        _ => return None,
    };
    Some(name.to_string())
}

/// Every physical code a key event implies: modifiers reported as flags
/// first (left-hand side), then the key itself.
pub fn physical_codes(key: &KeyEvent, layout: &KeyboardLayout) -> Vec<String> {
    let Some(main) = physical_code(key.code, layout) else {
        return Vec::new();
    };
    if matches!(key.code, KeyCode::Modifier(_)) {
        return vec![main];
    }

    let implied_shift = match key.code {
        KeyCode::Char(ch) => unshifted(ch).1,
        KeyCode::BackTab => true,
        _ => false,
    };
    let mut codes = Vec::with_capacity(5);
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        codes.push("ControlLeft".to_string());
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        codes.push("AltLeft".to_string());
    }
    if key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        codes.push("MetaLeft".to_string());
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) || implied_shift {
        codes.push("ShiftLeft".to_string());
    }
    codes.push(main);
    codes
}
