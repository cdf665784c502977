//! Which combos a page can actually capture.
//!
//! Each OS has two static sets. `always` holds combos the OS intercepts even
//! while the page is fullscreen with keyboard lock engaged (lock screen,
//! force quit, screenshots). `fullscreen` holds combos normally taken by the
//! browser chrome (close tab, new window) that become capturable once keyboard
//! lock is active. Every set entry is stored in normalized form.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::platform::Os;

/// Ordered from least to most restrictive so `max` picks the stricter level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionLevel {
    #[default]
    None,
    #[serde(alias = "fullscreen-preventable", alias = "fullscreen")]
    FullscreenPreventable,
    #[serde(alias = "always-protected", alias = "always")]
    AlwaysProtected,
}

impl ProtectionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtectionLevel::None => "none",
            ProtectionLevel::FullscreenPreventable => "fullscreen-preventable",
            ProtectionLevel::AlwaysProtected => "always-protected",
        }
    }

    /// Accepts the snake_case, kebab-case and short spellings catalogs use.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Some(ProtectionLevel::None),
            "fullscreen_preventable" | "fullscreen" => Some(ProtectionLevel::FullscreenPreventable),
            "always_protected" | "always" => Some(ProtectionLevel::AlwaysProtected),
            _ => None,
        }
    }

    /// Whether a combo at this level can be captured under the given capture state.
    pub fn is_capturable(self, keyboard_locked: bool) -> bool {
        match self {
            ProtectionLevel::None => true,
            ProtectionLevel::FullscreenPreventable => keyboard_locked,
            ProtectionLevel::AlwaysProtected => false,
        }
    }
}

impl fmt::Display for ProtectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protection sets for one OS.
#[derive(Clone, Debug, Default)]
pub struct ProtectionTable {
    always: HashSet<String>,
    fullscreen: HashSet<String>,
}

impl ProtectionTable {
    /// Build a table from raw combo strings; entries are normalized on insert.
    pub fn new(always: &[&str], fullscreen: &[&str]) -> Self {
        let norm = |set: &[&str]| -> HashSet<String> {
            set.iter()
                .map(|raw| NormalizedCombo::parse(raw).into())
                .collect()
        };
        Self {
            always: norm(always),
            fullscreen: norm(fullscreen),
        }
    }

    /// Always-protected membership wins over fullscreen-preventable.
    pub fn classify(&self, combo: &NormalizedCombo) -> ProtectionLevel {
        if self.always.contains(combo.as_str()) {
            ProtectionLevel::AlwaysProtected
        } else if self.fullscreen.contains(combo.as_str()) {
            ProtectionLevel::FullscreenPreventable
        } else {
            ProtectionLevel::None
        }
    }
}

// Browser chrome shortcuts shared by Chromium-family browsers on Windows and Linux.
const PC_BROWSER_RESERVED: &[&str] = &[
    "Ctrl+N",
    "Ctrl+Shift+N",
    "Ctrl+T",
    "Ctrl+Shift+T",
    "Ctrl+W",
    "Ctrl+F4",
    "Ctrl+Shift+W",
    "Ctrl+Tab",
    "Ctrl+Shift+Tab",
    "Ctrl+PageUp",
    "Ctrl+PageDown",
    "Ctrl+Shift+Q",
    "Alt+F4",
    "Alt+Tab",
    "Alt+Shift+Tab",
    "F11",
];

const WINDOWS_ALWAYS: &[&str] = &[
    "Ctrl+Alt+Delete",
    "Ctrl+Shift+Escape",
    "Meta+L",
    "Meta+Tab",
    "Meta+D",
    "Meta+E",
    "Meta+R",
    "Meta+I",
    "Meta+A",
    "Meta+X",
    "Meta+V",
    "Meta+H",
    "Meta+K",
    "Meta+P",
    "Meta+U",
    "Meta+M",
    "Meta+.",
    "Meta+Shift+M",
    "Meta+Shift+S",
    "Ctrl+Meta+D",
    "Ctrl+Meta+F4",
    "Ctrl+Meta+←",
    "Ctrl+Meta+→",
    "Ctrl+Meta+Shift+B",
    "Meta+↑",
    "Meta+↓",
    "Meta+←",
    "Meta+→",
    "PrintScreen",
    "Alt+PrintScreen",
    "Meta+PrintScreen",
];

const WINDOWS_FULLSCREEN_EXTRA: &[&str] = &["Alt+Space"];

const MACOS_ALWAYS: &[&str] = &[
    "Meta+Tab",
    "Meta+Shift+Tab",
    "Meta+Space",
    "Alt+Meta+Space",
    "Ctrl+Space",
    "Ctrl+Alt+Space",
    "Alt+Meta+Escape",
    "Ctrl+Meta+Q",
    "Meta+Q",
    "Meta+Shift+Q",
    "Alt+Meta+Shift+Q",
    "Meta+H",
    "Alt+Meta+H",
    "Meta+M",
    "Alt+Meta+D",
    "Ctrl+Meta+F",
    "Meta+Shift+3",
    "Meta+Shift+4",
    "Meta+Shift+5",
    "Meta+Shift+6",
    "Ctrl+↑",
    "Ctrl+↓",
    "Ctrl+←",
    "Ctrl+→",
    "Meta+F5",
    "Alt+Meta+F5",
    "Alt+Meta+8",
];

const MACOS_FULLSCREEN: &[&str] = &[
    "Meta+N",
    "Meta+Shift+N",
    "Meta+T",
    "Meta+Shift+T",
    "Meta+W",
    "Meta+Shift+W",
    "Alt+Meta+W",
    "Ctrl+Tab",
    "Ctrl+Shift+Tab",
    "Alt+Meta+←",
    "Alt+Meta+→",
    "Meta+Shift+[",
    "Meta+Shift+]",
    "Meta+`",
    "Meta+,",
];

const LINUX_ALWAYS: &[&str] = &[
    "Ctrl+Alt+Delete",
    "Ctrl+Alt+Backspace",
    "Ctrl+Alt+F1",
    "Ctrl+Alt+F2",
    "Ctrl+Alt+F3",
    "Ctrl+Alt+F4",
    "Ctrl+Alt+F5",
    "Ctrl+Alt+F6",
    "Ctrl+Alt+F7",
    "Ctrl+Alt+L",
    "Ctrl+Alt+T",
    "Ctrl+Alt+↑",
    "Ctrl+Alt+↓",
    "Ctrl+Alt+←",
    "Ctrl+Alt+→",
    "Meta+L",
    "Meta+A",
    "Meta+Tab",
    "PrintScreen",
    "Alt+PrintScreen",
    "Shift+PrintScreen",
];

fn tables() -> &'static HashMap<Os, ProtectionTable> {
    static TABLES: OnceLock<HashMap<Os, ProtectionTable>> = OnceLock::new();
    TABLES.get_or_init(|| {
        let windows_fullscreen: Vec<&str> = PC_BROWSER_RESERVED
            .iter()
            .chain(WINDOWS_FULLSCREEN_EXTRA)
            .copied()
            .collect();

        let mut m = HashMap::new();
        m.insert(
            Os::Windows,
            ProtectionTable::new(WINDOWS_ALWAYS, &windows_fullscreen),
        );
        m.insert(Os::Macos, ProtectionTable::new(MACOS_ALWAYS, MACOS_FULLSCREEN));
        m.insert(Os::Linux, ProtectionTable::new(LINUX_ALWAYS, PC_BROWSER_RESERVED));
        m
    })
}

/// Protection table for `os`.
pub fn table_for(os: Os) -> &'static ProtectionTable {
    static EMPTY: OnceLock<ProtectionTable> = OnceLock::new();
    tables()
        .get(&os)
        .unwrap_or_else(|| EMPTY.get_or_init(ProtectionTable::default))
}

/// Classify a normalized combo for `os`. The UI and the quiz both call this.
pub fn classify(combo: &NormalizedCombo, os: Os) -> ProtectionLevel {
    table_for(os).classify(combo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::combo::normalize;

    #[test]
    fn test_set_literals_are_normalized() {
        let all = [
            PC_BROWSER_RESERVED,
            WINDOWS_ALWAYS,
            WINDOWS_FULLSCREEN_EXTRA,
            MACOS_ALWAYS,
            MACOS_FULLSCREEN,
            LINUX_ALWAYS,
        ];
        for set in all {
            for &lit in set {
                assert_eq!(normalize(lit).as_str(), lit, "literal {lit:?} is not normalized");
            }
        }
    }

    #[test]
    fn test_sets_are_disjoint_per_os() {
        for &os in Os::all() {
            let table = table_for(os);
            let overlap: Vec<_> = table.always.intersection(&table.fullscreen).collect();
            assert!(overlap.is_empty(), "{os:?} overlap: {overlap:?}");
        }
    }

    #[test]
    fn test_windows_classification() {
        assert_eq!(
            classify(&normalize("Ctrl+Alt+Del"), Os::Windows),
            ProtectionLevel::AlwaysProtected
        );
        assert_eq!(
            classify(&normalize("Win+L"), Os::Windows),
            ProtectionLevel::AlwaysProtected
        );
        assert_eq!(
            classify(&normalize("Ctrl+W"), Os::Windows),
            ProtectionLevel::FullscreenPreventable
        );
        assert_eq!(
            classify(&normalize("Alt+F4"), Os::Windows),
            ProtectionLevel::FullscreenPreventable
        );
        assert_eq!(classify(&normalize("Ctrl+C"), Os::Windows), ProtectionLevel::None);
    }

    #[test]
    fn test_macos_classification() {
        assert_eq!(
            classify(&normalize("Cmd+Option+Esc"), Os::Macos),
            ProtectionLevel::AlwaysProtected
        );
        assert_eq!(
            classify(&normalize("Cmd+Shift+4"), Os::Macos),
            ProtectionLevel::AlwaysProtected
        );
        assert_eq!(
            classify(&normalize("Cmd+W"), Os::Macos),
            ProtectionLevel::FullscreenPreventable
        );
        assert_eq!(classify(&normalize("Ctrl+W"), Os::Macos), ProtectionLevel::None);
    }

    #[test]
    fn test_same_combo_differs_across_os() {
        let combo = normalize("Meta+L");
        assert_eq!(classify(&combo, Os::Windows), ProtectionLevel::AlwaysProtected);
        assert_eq!(classify(&combo, Os::Macos), ProtectionLevel::None);
    }

    #[test]
    fn test_always_takes_precedence_when_in_both_sets() {
        let table = ProtectionTable::new(&["Ctrl+Q"], &["ctrl+q", "Ctrl+W"]);
        assert_eq!(table.classify(&normalize("Ctrl+Q")), ProtectionLevel::AlwaysProtected);
        assert_eq!(
            table.classify(&normalize("Ctrl+W")),
            ProtectionLevel::FullscreenPreventable
        );
    }

    #[test]
    fn test_empty_combo_is_unprotected() {
        assert_eq!(classify(&NormalizedCombo::empty(), Os::Linux), ProtectionLevel::None);
    }

    #[test]
    fn test_capturable() {
        assert!(ProtectionLevel::None.is_capturable(false));
        assert!(!ProtectionLevel::FullscreenPreventable.is_capturable(false));
        assert!(ProtectionLevel::FullscreenPreventable.is_capturable(true));
        assert!(!ProtectionLevel::AlwaysProtected.is_capturable(true));
    }

    #[test]
    fn test_level_ordering_is_strictness() {
        assert!(ProtectionLevel::AlwaysProtected > ProtectionLevel::FullscreenPreventable);
        assert!(ProtectionLevel::FullscreenPreventable > ProtectionLevel::None);
    }

    #[test]
    fn test_serde_accepts_kebab_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: ProtectionLevel,
        }
        let w: Wrapper = toml::from_str("level = \"fullscreen-preventable\"").unwrap();
        assert_eq!(w.level, ProtectionLevel::FullscreenPreventable);
        let w: Wrapper = toml::from_str("level = \"always_protected\"").unwrap();
        assert_eq!(w.level, ProtectionLevel::AlwaysProtected);
    }

    #[test]
    fn test_from_key_spellings() {
        assert_eq!(
            ProtectionLevel::from_key("fullscreen_preventable"),
            Some(ProtectionLevel::FullscreenPreventable)
        );
        assert_eq!(
            ProtectionLevel::from_key("Always-Protected"),
            Some(ProtectionLevel::AlwaysProtected)
        );
        assert_eq!(ProtectionLevel::from_key("none"), Some(ProtectionLevel::None));
        assert_eq!(ProtectionLevel::from_key("sometimes"), None);
    }
}
