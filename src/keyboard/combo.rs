//! Deterministic combo strings used as dictionary keys.
//!
//! A normalized combo is `Mod+...+Main+...`: modifiers deduplicated and ordered
//! Ctrl, Alt, Meta, Shift, followed by main keys in the order they were given.
//! `normalize` runs on every key event, so it stays allocation-light and never
//! fails; garbage in produces a best-effort combo, empty in produces empty out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keyboard::platform::Os;
use crate::keyboard::token::{self, CanonicalToken, modifier_rank};

/// Combinator between tokens.
pub const SEPARATOR: char = '+';

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedCombo(String);

impl NormalizedCombo {
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Normalize a delimiter-joined key string such as `"shift + ctrl + a"`.
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<String> = split_tokens(raw)
            .into_iter()
            .map(|t| canonical_name(&t))
            .collect();
        Self::assemble(tokens.iter().map(String::as_str))
    }

    /// Normalize an ordered list of canonical tokens (e.g. the live pressed set).
    pub fn from_tokens(tokens: &[CanonicalToken]) -> Self {
        Self::assemble(tokens.iter().map(CanonicalToken::as_str))
    }

    fn assemble<'a>(tokens: impl Iterator<Item = &'a str>) -> Self {
        let mut modifiers: Vec<usize> = Vec::with_capacity(4);
        let mut mains: Vec<&str> = Vec::with_capacity(2);
        for tok in tokens {
            if tok.is_empty() {
                continue;
            }
            match modifier_rank(tok) {
                Some(rank) => {
                    if !modifiers.contains(&rank) {
                        modifiers.push(rank);
                    }
                }
                None => mains.push(tok),
            }
        }
        modifiers.sort_unstable();

        let mut out = String::with_capacity(16);
        let mut parts: Vec<&str> = modifiers
            .iter()
            .map(|&rank| token::MODIFIER_ORDER[rank])
            .collect();
        parts.extend(mains);
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(part);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens of this combo in canonical order.
    pub fn tokens(&self) -> Vec<&str> {
        split_tokens_borrowed(&self.0)
    }

    pub fn modifiers(&self) -> Vec<&str> {
        self.tokens()
            .into_iter()
            .filter(|t| modifier_rank(t).is_some())
            .collect()
    }

    pub fn main_keys(&self) -> Vec<&str> {
        self.tokens()
            .into_iter()
            .filter(|t| modifier_rank(t).is_none())
            .collect()
    }

    pub fn is_modifier_only(&self) -> bool {
        !self.is_empty() && self.main_keys().is_empty()
    }

    /// Combo made of just the modifier subset (`Ctrl+Shift+T` -> `Ctrl+Shift`).
    pub fn modifier_prefix(&self) -> NormalizedCombo {
        Self::assemble(self.modifiers().into_iter())
    }

    /// Every ordered prefix of the modifier list, shortest first
    /// (`Ctrl+Alt+Delete` -> `Ctrl`, `Ctrl+Alt`).
    pub fn modifier_prefixes(&self) -> Vec<NormalizedCombo> {
        let modifiers = self.modifiers();
        (1..=modifiers.len())
            .map(|n| Self::assemble(modifiers[..n].iter().copied()))
            .collect()
    }

    /// Human-readable form with OS-specific modifier names.
    pub fn display(&self, os: Os) -> String {
        self.tokens()
            .into_iter()
            .map(|t| token::display_token(t, os))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl From<String> for NormalizedCombo {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for NormalizedCombo {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<NormalizedCombo> for String {
    fn from(combo: NormalizedCombo) -> Self {
        combo.0
    }
}

impl fmt::Display for NormalizedCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw key string. Shorthand for [`NormalizedCombo::parse`].
pub fn normalize(raw: &str) -> NormalizedCombo {
    NormalizedCombo::parse(raw)
}

/// Split on `+`, treating a doubled `++` as the literal plus key.
fn split_tokens_borrowed(raw: &str) -> Vec<&str> {
    let parts: Vec<&str> = raw.split(SEPARATOR).collect();
    let mut tokens = Vec::with_capacity(parts.len());
    let mut i = 0;
    while i < parts.len() {
        let part = parts[i];
        if part.is_empty() {
            if parts.get(i + 1).is_some_and(|next| next.is_empty()) {
                tokens.push("+");
                i += 2;
                continue;
            }
        } else {
            tokens.push(part);
        }
        i += 1;
    }
    tokens
}

fn split_tokens(raw: &str) -> Vec<String> {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    split_tokens_borrowed(&stripped)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Synonym table: OS spellings and loose aliases to canonical token names.
fn canonical_name(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    let mapped = match lower.as_str() {
        "ctrl" | "control" | "ctl" => token::CTRL,
        "alt" | "option" | "opt" | "altgraph" => token::ALT,
        "win" | "windows" | "cmd" | "command" | "meta" | "super" | "os" => token::META,
        "shift" => token::SHIFT,
        "esc" | "escape" => "Escape",
        "enter" | "return" => "Enter",
        "space" | "spacebar" => "Space",
        "tab" => "Tab",
        "backspace" => "Backspace",
        "del" | "delete" => "Delete",
        "ins" | "insert" => "Insert",
        "home" => "Home",
        "end" => "End",
        "pgup" | "pageup" => "PageUp",
        "pgdn" | "pagedown" => "PageDown",
        "up" | "arrowup" => "↑",
        "down" | "arrowdown" => "↓",
        "left" | "arrowleft" => "←",
        "right" | "arrowright" => "→",
        "prtsc" | "printscreen" => "PrintScreen",
        "plus" => "+",
        "comma" => ",",
        "period" => ".",
        _ => {
            if is_function_key(&lower) {
                return lower.to_ascii_uppercase();
            }
            let mut chars = raw.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                if ch.is_alphabetic() {
                    return ch.to_uppercase().collect();
                }
            }
            return raw.to_string();
        }
    };
    mapped.to_string()
}

fn is_function_key(lower: &str) -> bool {
    lower
        .strip_prefix('f')
        .is_some_and(|n| !n.is_empty() && n.len() <= 2 && n.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_invariance() {
        assert_eq!(normalize("Shift+Ctrl+A").as_str(), "Ctrl+Shift+A");
        assert_eq!(normalize("Ctrl+Shift+A"), normalize("Shift+Ctrl+A"));
        assert_eq!(normalize("shift+meta+alt+ctrl+k").as_str(), "Ctrl+Alt+Meta+Shift+K");
    }

    #[test]
    fn test_os_synonyms() {
        assert_eq!(normalize("Win+L").as_str(), "Meta+L");
        assert_eq!(normalize("Cmd+L").as_str(), "Meta+L");
        assert_eq!(normalize("Command+Option+Esc").as_str(), "Alt+Meta+Escape");
        assert_eq!(normalize("Control+c").as_str(), "Ctrl+C");
    }

    #[test]
    fn test_idempotence() {
        for raw in [
            "Shift+Ctrl+A",
            "cmd + shift + [",
            "Ctrl++",
            "g+i",
            "ctrl+alt+delete",
            "F12",
            "Alt",
            "",
            "Meta+↑",
            "Ctrl+Shift",
        ] {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_whitespace_stripped() {
        assert_eq!(normalize("  ctrl +  shift + t ").as_str(), "Ctrl+Shift+T");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert_eq!(normalize("Ctrl+").as_str(), "Ctrl");
        assert_eq!(normalize("+").as_str(), "+");
    }

    #[test]
    fn test_modifier_only_is_distinct() {
        let mods = normalize("Ctrl+Shift");
        assert!(mods.is_modifier_only());
        assert_ne!(mods, normalize("Ctrl+Shift+S"));
        assert!(!normalize("Ctrl+Shift+S").is_modifier_only());
    }

    #[test]
    fn test_main_key_order_preserved() {
        assert_eq!(normalize("g+i").as_str(), "G+I");
        assert_eq!(normalize("i+g").as_str(), "I+G");
    }

    #[test]
    fn test_duplicate_modifiers_collapse() {
        assert_eq!(normalize("Ctrl+Control+X").as_str(), "Ctrl+X");
    }

    #[test]
    fn test_literal_plus_key() {
        assert_eq!(normalize("Ctrl++").as_str(), "Ctrl++");
        assert_eq!(normalize("ctrl+plus").as_str(), "Ctrl++");
        assert_eq!(normalize("Ctrl++").main_keys(), vec!["+"]);
    }

    #[test]
    fn test_function_keys_and_aliases() {
        assert_eq!(normalize("f5").as_str(), "F5");
        assert_eq!(normalize("alt+f4").as_str(), "Alt+F4");
        assert_eq!(normalize("ctrl+pgdn").as_str(), "Ctrl+PageDown");
        assert_eq!(normalize("meta+up").as_str(), "Meta+↑");
        assert_eq!(normalize("Find").as_str(), "Find");
    }

    #[test]
    fn test_from_tokens_matches_parse() {
        let tokens = vec![
            CanonicalToken::new("Shift"),
            CanonicalToken::new("T"),
            CanonicalToken::new("Ctrl"),
        ];
        assert_eq!(NormalizedCombo::from_tokens(&tokens), normalize("Ctrl+Shift+T"));
    }

    #[test]
    fn test_modifier_prefixes() {
        let combo = normalize("Ctrl+Alt+Shift+Delete");
        assert_eq!(combo.modifier_prefix().as_str(), "Ctrl+Alt+Shift");
        let prefixes: Vec<String> = combo
            .modifier_prefixes()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(prefixes, vec!["Ctrl", "Ctrl+Alt", "Ctrl+Alt+Shift"]);
        assert!(normalize("F1").modifier_prefixes().is_empty());
    }

    #[test]
    fn test_display_uses_os_labels() {
        let combo = normalize("Cmd+Shift+Z");
        assert_eq!(combo.display(Os::Macos), "Cmd + Shift + Z");
        assert_eq!(combo.display(Os::Windows), "Win + Shift + Z");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let combo: NormalizedCombo = serde_json::from_str("\"shift+cmd+p\"").unwrap();
        assert_eq!(combo.as_str(), "Meta+Shift+P");
    }
}
