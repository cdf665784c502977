use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::protection::{self, ProtectionLevel};
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::platform::Os;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    #[default]
    Standard,
    Hard,
    Madmax,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Standard => "standard",
            Difficulty::Hard => "hard",
            Difficulty::Madmax => "madmax",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "basic" => Some(Difficulty::Basic),
            "standard" => Some(Difficulty::Standard),
            "hard" => Some(Difficulty::Hard),
            "madmax" => Some(Difficulty::Madmax),
            _ => None,
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Basic,
            Difficulty::Standard,
            Difficulty::Hard,
            Difficulty::Madmax,
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressType {
    #[default]
    Simultaneous,
    Sequential,
}

impl PressType {
    pub fn as_str(self) -> &'static str {
        match self {
            PressType::Simultaneous => "simultaneous",
            PressType::Sequential => "sequential",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "simultaneous" => Some(PressType::Simultaneous),
            "sequential" => Some(PressType::Sequential),
            _ => None,
        }
    }
}

/// Shortcut entry as it appears in a catalog file. Every field is optional so a
/// single malformed entry can be rejected without failing the whole catalog.
/// Enumerated fields stay strings here for the same reason and are checked in
/// [`ShortcutRecord::from_raw`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawShortcut {
    #[serde(default)]
    pub keys: Option<String>,
    #[serde(default)]
    pub keys_macos: Option<String>,
    #[serde(default)]
    pub keys_linux: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_localized: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub press_type: Option<String>,
    #[serde(default)]
    pub protection_windows: Option<String>,
    #[serde(default)]
    pub protection_macos: Option<String>,
}

impl RawShortcut {
    /// Key string for `os`: platform-specific override, else the default keys.
    pub fn keys_for(&self, os: Os) -> Option<&str> {
        let specific = match os {
            Os::Macos => self.keys_macos.as_deref(),
            Os::Linux => self.keys_linux.as_deref(),
            Os::Windows => None,
        };
        specific
            .or(self.keys.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("shortcut has no keys")]
    MissingKeys,
    #[error("shortcut {0:?} has no description")]
    MissingDescription(String),
    #[error("unknown {field} {value:?}")]
    InvalidField { field: &'static str, value: String },
}

fn parse_field<T>(
    field: &'static str,
    value: Option<&str>,
    from_key: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, RecordError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(v) => from_key(v).map(Some).ok_or_else(|| RecordError::InvalidField {
            field,
            value: v.to_string(),
        }),
    }
}

/// A validated shortcut bound to one application and OS.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShortcutRecord {
    pub app: String,
    pub raw_keys: String,
    pub combo: NormalizedCombo,
    pub description: String,
    pub description_localized: Option<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub press_type: PressType,
    pub protection_windows: Option<ProtectionLevel>,
    pub protection_macos: Option<ProtectionLevel>,
}

impl ShortcutRecord {
    pub fn from_raw(app: &str, raw: &RawShortcut, os: Os) -> Result<Self, RecordError> {
        let keys = raw.keys_for(os).ok_or(RecordError::MissingKeys)?;
        let description = raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| RecordError::MissingDescription(keys.to_string()))?;
        let combo = NormalizedCombo::parse(keys);
        if combo.is_empty() {
            return Err(RecordError::MissingKeys);
        }
        let difficulty = parse_field("difficulty", raw.difficulty.as_deref(), Difficulty::from_key)?;
        let press_type = parse_field("press_type", raw.press_type.as_deref(), PressType::from_key)?;
        let protection_windows = parse_field(
            "protection_windows",
            raw.protection_windows.as_deref(),
            ProtectionLevel::from_key,
        )?;
        let protection_macos = parse_field(
            "protection_macos",
            raw.protection_macos.as_deref(),
            ProtectionLevel::from_key,
        )?;

        Ok(Self {
            app: app.to_string(),
            raw_keys: keys.to_string(),
            combo,
            description: description.to_string(),
            description_localized: raw.description_localized.clone(),
            category: raw
                .category
                .clone()
                .unwrap_or_else(|| "general".to_string()),
            difficulty: difficulty.unwrap_or_default(),
            press_type: press_type.unwrap_or_default(),
            protection_windows,
            protection_macos,
        })
    }

    /// Convenience constructor for a simultaneous record with default metadata.
    pub fn simple(app: &str, keys: &str, description: &str) -> Self {
        Self {
            app: app.to_string(),
            raw_keys: keys.to_string(),
            combo: NormalizedCombo::parse(keys),
            description: description.to_string(),
            description_localized: None,
            category: "general".to_string(),
            difficulty: Difficulty::default(),
            press_type: PressType::Simultaneous,
            protection_windows: None,
            protection_macos: None,
        }
    }

    /// Protection level the catalog itself declares for `os`.
    pub fn declared_protection(&self, os: Os) -> Option<ProtectionLevel> {
        match os {
            Os::Windows => self.protection_windows,
            Os::Macos => self.protection_macos,
            Os::Linux => None,
        }
    }

    /// Effective protection on `os`: the stricter of the catalog's declaration
    /// and [`protection::classify`].
    pub fn protection_on(&self, os: Os) -> ProtectionLevel {
        let classified = protection::classify(&self.combo, os);
        self.declared_protection(os)
            .map_or(classified, |declared| declared.max(classified))
    }

    pub fn is_sequential(&self) -> bool {
        self.press_type == PressType::Sequential
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_press_type(mut self, press_type: PressType) -> Self {
        self.press_type = press_type;
        self
    }
}
