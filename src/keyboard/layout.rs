use serde::{Deserialize, Serialize};

/// Character rows of the alphanumeric block, indexed by physical position.
///
/// Physical key codes (`KeyA`, `Semicolon`, ...) name QWERTY positions, so a
/// layout translates a code by looking up the QWERTY position and reading the
/// character at the same row/column of its own rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyboardLayout {
    pub name: String,
    pub rows: Vec<Vec<char>>,
}

const QWERTY_ROWS: [&str; 3] = ["qwertyuiop[]", "asdfghjkl;'", "zxcvbnm,./"];
const DVORAK_ROWS: [&str; 3] = ["',.pyfgcrl/=", "aoeuidhtns-", ";qjkxbmwvz"];
const COLEMAK_ROWS: [&str; 3] = ["qwfpgjluy;[]", "arstdhneio'", "zxcvbkm,./"];

fn rows_from(rows: &[&str; 3]) -> Vec<Vec<char>> {
    rows.iter().map(|row| row.chars().collect()).collect()
}

impl KeyboardLayout {
    pub fn qwerty() -> Self {
        Self {
            name: "QWERTY".to_string(),
            rows: rows_from(&QWERTY_ROWS),
        }
    }

    pub fn dvorak() -> Self {
        Self {
            name: "Dvorak".to_string(),
            rows: rows_from(&DVORAK_ROWS),
        }
    }

    pub fn colemak() -> Self {
        Self {
            name: "Colemak".to_string(),
            rows: rows_from(&COLEMAK_ROWS),
        }
    }

    /// Resolve a layout by config name, falling back to QWERTY.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dvorak" => Self::dvorak(),
            "colemak" => Self::colemak(),
            _ => Self::qwerty(),
        }
    }

    pub fn valid_names() -> &'static [&'static str] {
        &["qwerty", "dvorak", "colemak"]
    }

    /// Character this layout produces at the position where QWERTY has `qwerty`.
    /// Characters outside the alphanumeric block are returned unchanged.
    pub fn translate(&self, qwerty: char) -> char {
        let lower = qwerty.to_ascii_lowercase();
        for (row_idx, row) in QWERTY_ROWS.iter().enumerate() {
            if let Some(col) = row.chars().position(|c| c == lower) {
                return self
                    .rows
                    .get(row_idx)
                    .and_then(|r| r.get(col))
                    .copied()
                    .unwrap_or(qwerty);
            }
        }
        qwerty
    }

    /// Inverse of [`Self::translate`]: the QWERTY character at the position
    /// where this layout produces `ch`, if `ch` lives in the alphanumeric block.
    pub fn position_of(&self, ch: char) -> Option<char> {
        let lower = ch.to_ascii_lowercase();
        for (row_idx, row) in self.rows.iter().enumerate() {
            if let Some(col) = row.iter().position(|&c| c == lower) {
                return QWERTY_ROWS
                    .get(row_idx)
                    .and_then(|r| r.chars().nth(col));
            }
        }
        None
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::qwerty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qwerty_is_identity() {
        let layout = KeyboardLayout::qwerty();
        for ch in "abcxyz;,./".chars() {
            assert_eq!(layout.translate(ch), ch);
        }
    }

    #[test]
    fn test_dvorak_remaps_positions() {
        let layout = KeyboardLayout::dvorak();
        assert_eq!(layout.translate('s'), 'o');
        assert_eq!(layout.translate('q'), '\'');
        assert_eq!(layout.translate('z'), ';');
    }

    #[test]
    fn test_colemak_keeps_shared_keys() {
        let layout = KeyboardLayout::colemak();
        assert_eq!(layout.translate('a'), 'a');
        assert_eq!(layout.translate('e'), 'f');
        assert_eq!(layout.translate('j'), 'n');
    }

    #[test]
    fn test_unknown_name_falls_back_to_qwerty() {
        assert_eq!(KeyboardLayout::from_name("workman").name, "QWERTY");
        assert_eq!(KeyboardLayout::from_name("Dvorak").name, "Dvorak");
    }

    #[test]
    fn test_position_of_inverts_translate() {
        for layout in [KeyboardLayout::qwerty(), KeyboardLayout::dvorak(), KeyboardLayout::colemak()] {
            for ch in "qwertyuiopasdfghjklzxcvbnm".chars() {
                let produced = layout.translate(ch);
                assert_eq!(layout.position_of(produced), Some(ch), "{} {ch}", layout.name);
            }
        }
        assert_eq!(KeyboardLayout::qwerty().position_of('1'), None);
    }

    #[test]
    fn test_outside_alpha_block_unchanged() {
        assert_eq!(KeyboardLayout::dvorak().translate('1'), '1');
    }
}
