use std::fs;
use std::path::PathBuf;

use ratatui::style::Color;
use log::warn;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::protection::ProtectionLevel;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_pending: String,
    pub key_cap_bg: String,
    pub key_cap_fg: String,
    pub accent: String,
    pub accent_dim: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// User themes in `config_dir/shortcutdr/themes` shadow bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");
        let user_path = Self::user_dir().join(&filename);
        if let Ok(content) = fs::read_to_string(&user_path) {
            match toml::from_str::<Theme>(&content) {
                Ok(theme) => return Some(theme),
                Err(err) => warn!("ignoring {}: {err}", user_path.display()),
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str(content).ok()
    }

    pub fn user_dir() -> PathBuf {
        Config::config_dir().join("themes")
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("terminal-default").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            text_pending: "#585b70".to_string(),
            key_cap_bg: "#f5e0dc".to_string(),
            key_cap_fg: "#1e1e2e".to_string(),
            accent: "#89b4fa".to_string(),
            accent_dim: "#45475a".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            bar_filled: "#89b4fa".to_string(),
            bar_empty: "#313244".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_pending(&self) -> Color { Self::parse_color(&self.text_pending) }
    pub fn key_cap_bg(&self) -> Color { Self::parse_color(&self.key_cap_bg) }
    pub fn key_cap_fg(&self) -> Color { Self::parse_color(&self.key_cap_fg) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }

    /// Colour for a shortcut given whether the terminal can currently capture it.
    pub fn protection(&self, level: ProtectionLevel, keyboard_locked: bool) -> Color {
        match level {
            ProtectionLevel::None => self.success(),
            ProtectionLevel::FullscreenPreventable if keyboard_locked => self.warning(),
            _ => self.error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"terminal-default".to_string()));
        for name in names {
            assert!(Theme::load(&name).is_some(), "{name} failed to parse");
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#ff0080"), Color::Rgb(255, 0, 128));
        assert_eq!(ThemeColors::parse_color("nope"), Color::White);
    }

    #[test]
    fn test_protection_colours() {
        let colors = ThemeColors::default();
        assert_eq!(colors.protection(ProtectionLevel::None, false), colors.success());
        assert_eq!(colors.protection(ProtectionLevel::FullscreenPreventable, false), colors.error());
        assert_eq!(colors.protection(ProtectionLevel::FullscreenPreventable, true), colors.warning());
        assert_eq!(colors.protection(ProtectionLevel::AlwaysProtected, true), colors.error());
    }
}
