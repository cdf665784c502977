use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::shortcut::Difficulty;
use crate::keyboard::layout::KeyboardLayout;
use crate::keyboard::platform::Os;
use crate::keyboard::token::KeyContext;
use crate::session::quiz::{QuizMode, QuizSettings};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_os")]
    pub os: String,
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
    #[serde(default = "default_apps")]
    pub apps: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_quiz_mode")]
    pub quiz_mode: String,
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    #[serde(default = "default_question_time_limit_secs")]
    pub question_time_limit_secs: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_sequence_timeout_ticks")]
    pub sequence_timeout_ticks: u32,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_available_limit")]
    pub available_limit: usize,
    #[serde(default)]
    pub assume_fullscreen: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_os() -> String {
    "auto".to_string()
}
fn default_keyboard_layout() -> String {
    "qwerty".to_string()
}
fn default_apps() -> Vec<String> {
    vec!["chrome".to_string()]
}
fn default_difficulty() -> String {
    "all".to_string()
}
fn default_quiz_mode() -> String {
    "casual".to_string()
}
fn default_total_questions() -> usize {
    10
}
fn default_question_time_limit_secs() -> u64 {
    15
}
fn default_tick_rate_ms() -> u64 {
    100
}
fn default_sequence_timeout_ticks() -> u32 {
    10
}
fn default_history_capacity() -> usize {
    10
}
fn default_available_limit() -> usize {
    60
}
fn default_theme() -> String {
    "terminal-default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            os: default_os(),
            keyboard_layout: default_keyboard_layout(),
            apps: default_apps(),
            difficulty: default_difficulty(),
            quiz_mode: default_quiz_mode(),
            total_questions: default_total_questions(),
            question_time_limit_secs: default_question_time_limit_secs(),
            tick_rate_ms: default_tick_rate_ms(),
            sequence_timeout_ticks: default_sequence_timeout_ticks(),
            history_capacity: default_history_capacity(),
            available_limit: default_available_limit(),
            assume_fullscreen: false,
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shortcutdr")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Repair every field that may hold a stale or misspelled value.
    /// Call after deserialization with the catalog ids that actually exist.
    pub fn normalize(&mut self, valid_apps: &[String]) {
        self.normalize_os();
        self.normalize_keyboard_layout(KeyboardLayout::valid_names());
        self.normalize_apps(valid_apps);
        self.normalize_difficulty();
        self.normalize_quiz_mode();
        self.normalize_numbers();
    }

    pub fn normalize_os(&mut self) {
        if self.os == "auto" {
            return;
        }
        match Os::from_name(&self.os) {
            Some(os) => self.os = os.as_str().to_string(),
            None => self.os = default_os(),
        }
    }

    pub fn normalize_keyboard_layout(&mut self, valid_keys: &[&str]) {
        self.keyboard_layout = self.keyboard_layout.to_ascii_lowercase();
        if !valid_keys.contains(&self.keyboard_layout.as_str()) {
            self.keyboard_layout = default_keyboard_layout();
        }
    }

    /// Drop unknown catalog ids; fall back to the first valid id if nothing is left.
    pub fn normalize_apps(&mut self, valid_keys: &[String]) {
        self.apps.retain(|app| valid_keys.contains(app));
        self.apps.dedup();
        if self.apps.is_empty() {
            let fallback = default_apps()
                .into_iter()
                .find(|app| valid_keys.contains(app))
                .or_else(|| valid_keys.first().cloned());
            self.apps.extend(fallback);
        }
    }

    pub fn normalize_difficulty(&mut self) {
        self.difficulty = self.difficulty.to_ascii_lowercase();
        if self.difficulty != "all" && Difficulty::from_key(&self.difficulty).is_none() {
            self.difficulty = default_difficulty();
        }
    }

    pub fn normalize_quiz_mode(&mut self) {
        self.quiz_mode = self.quiz_mode.to_ascii_lowercase();
        if QuizMode::from_key(&self.quiz_mode).is_none() {
            self.quiz_mode = default_quiz_mode();
        }
    }

    fn normalize_numbers(&mut self) {
        if self.question_time_limit_secs == 0 {
            self.question_time_limit_secs = default_question_time_limit_secs();
        }
        if self.tick_rate_ms == 0 {
            self.tick_rate_ms = default_tick_rate_ms();
        }
        if self.sequence_timeout_ticks == 0 {
            self.sequence_timeout_ticks = default_sequence_timeout_ticks();
        }
        if self.available_limit == 0 {
            self.available_limit = default_available_limit();
        }
    }

    pub fn resolved_os(&self) -> Os {
        Os::from_name(&self.os).unwrap_or_else(Os::detect)
    }

    pub fn key_context(&self) -> KeyContext {
        KeyContext::new(self.resolved_os(), KeyboardLayout::from_name(&self.keyboard_layout))
    }

    pub fn difficulty_filter(&self) -> Option<Difficulty> {
        Difficulty::from_key(&self.difficulty)
    }

    pub fn mode(&self) -> QuizMode {
        QuizMode::from_key(&self.quiz_mode).unwrap_or_default()
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Longest gap allowed between steps of a sequential combo.
    pub fn sequence_timeout(&self) -> Duration {
        self.tick_rate() * self.sequence_timeout_ticks
    }

    pub fn quiz_settings(&self) -> QuizSettings {
        QuizSettings {
            apps: self.apps.clone(),
            difficulty: self.difficulty_filter(),
            mode: self.mode(),
            os: self.resolved_os(),
            total_questions: self.total_questions,
            time_limit: Duration::from_secs(self.question_time_limit_secs),
            fullscreen: self.assume_fullscreen,
            reserved: Vec::new(),
        }
    }
}
