use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};

use crate::config::Config;
use crate::engine::catalog::ShortcutCatalog;
use crate::engine::index::ShortcutIndex;
use crate::engine::matcher::MatchEngine;
use crate::event::physical_codes;
use crate::keyboard::combo::{NormalizedCombo, normalize};
use crate::keyboard::token::{CanonicalToken, KeyContext};
use crate::session::history::ComboHistory;
use crate::session::quiz::QuizStatus;
use crate::session::quiz_session::QuizSession;
use crate::session::result::QuizResult;
use crate::session::visualizer::Visualizer;
use crate::ui::theme::Theme;

/// Without key-release reporting, held keys are dropped after this much silence.
const STALE_KEY_TIMEOUT: Duration = Duration::from_millis(150);

/// Keys [`App::handle_command`] takes while a quiz runs, so they can never be
/// the answer to a question.
const QUIZ_COMMAND_KEYS: &[&str] = &["F1", "F2", "F11", "Escape", "Ctrl+Q"];

pub fn quiz_command_combos() -> Vec<NormalizedCombo> {
    QUIZ_COMMAND_KEYS.iter().map(|keys| normalize(keys)).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Visualizer,
    Quiz,
    QuizResult,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub ctx: KeyContext,
    /// Catalog ids the visualizer can cycle through.
    pub catalogs: Vec<String>,
    pub catalog_selected: usize,
    pub catalog_name: String,
    pub visualizer: Visualizer,
    pub quiz: QuizSession,
    pub last_result: Option<QuizResult>,
    /// Simulated fullscreen with keyboard lock.
    pub fullscreen: bool,
    /// Terminal reports key releases and bare modifier presses.
    pub keyboard_enhanced: bool,
    pub last_key_time: Option<Instant>,
    pub summary_path: Option<PathBuf>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme) -> Self {
        let ctx = config.key_context();
        let catalogs = ShortcutCatalog::discover(Some(&ShortcutCatalog::user_dir()));
        let catalog_selected = config
            .apps
            .first()
            .and_then(|first| catalogs.iter().position(|id| id == first))
            .unwrap_or(0);
        let (catalog_name, index) = match catalogs.get(catalog_selected) {
            Some(id) => load_index(id, &ctx),
            None => (String::new(), ShortcutIndex::from_records("", ctx.os, Vec::new())),
        };
        let visualizer = Visualizer::new(
            index,
            MatchEngine::new(config.available_limit, config.sequence_timeout()),
            ComboHistory::new(config.history_capacity),
            ctx.clone(),
        );
        let quiz = QuizSession::new(Vec::new(), ctx.clone());

        Self {
            screen: AppScreen::Visualizer,
            fullscreen: config.assume_fullscreen,
            config,
            theme,
            ctx,
            catalogs,
            catalog_selected,
            catalog_name,
            visualizer,
            quiz,
            last_result: None,
            keyboard_enhanced: false,
            last_key_time: None,
            summary_path: None,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Press && self.handle_command(&key, now) {
            return;
        }

        let mut codes = physical_codes(&key, &self.ctx.layout);
        if codes.is_empty() {
            return;
        }
        // With release reporting, modifiers arrive as their own events.
        if self.keyboard_enhanced {
            codes.drain(..codes.len() - 1);
        }

        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if !self.keyboard_enhanced {
                    self.release_except(&codes, now);
                }
                for code in &codes {
                    self.key_down(code, now);
                }
                self.last_key_time = Some(now);
            }
            KeyEventKind::Release => {
                for code in &codes {
                    self.key_up(code, now);
                }
            }
        }
    }

    /// App-level shortcuts. Returns `true` when the key was consumed. Only the
    /// bare keys are taken, so `Shift+Escape` or `Ctrl+F2` still reach the
    /// visualizer and the quiz.
    fn handle_command(&mut self, key: &KeyEvent, now: Instant) -> bool {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return true;
        }
        if key.modifiers != KeyModifiers::NONE {
            return false;
        }
        match key.code {
            KeyCode::F(1) => self.go_to_visualizer(),
            KeyCode::F(2) => self.start_quiz(now),
            KeyCode::F(3) if self.screen == AppScreen::Visualizer => self.next_catalog(),
            KeyCode::F(11) => self.toggle_fullscreen(now),
            KeyCode::Esc if self.screen == AppScreen::Quiz => self.toggle_pause(now),
            _ => return false,
        }
        true
    }

    fn key_down(&mut self, code: &str, now: Instant) {
        match self.screen {
            AppScreen::Visualizer => {
                self.visualizer.key_down(code, now);
            }
            AppScreen::Quiz => {
                self.quiz.key_down(code, now);
            }
            AppScreen::QuizResult => {}
        }
    }

    fn key_up(&mut self, code: &str, now: Instant) {
        match self.screen {
            AppScreen::Visualizer => {
                self.visualizer.key_up(code, now);
            }
            AppScreen::Quiz => {
                self.quiz.key_up(code, now);
            }
            AppScreen::QuizResult => {}
        }
    }

    fn held_codes(&self) -> Vec<String> {
        match self.screen {
            AppScreen::Visualizer => self.visualizer.pressed().codes().to_vec(),
            AppScreen::Quiz => self.quiz.pressed().codes().to_vec(),
            AppScreen::QuizResult => Vec::new(),
        }
    }

    fn release_except(&mut self, keep: &[String], now: Instant) {
        for code in self.held_codes() {
            if !keep.contains(&code) {
                self.key_up(&code, now);
            }
        }
    }

    /// Terminal lost focus: nothing held can be trusted anymore.
    pub fn blur(&mut self) {
        self.visualizer.blur();
        self.quiz.blur();
        self.last_key_time = None;
    }

    pub fn tick(&mut self, now: Instant) {
        if !self.keyboard_enhanced {
            if let Some(last) = self.last_key_time {
                if now.saturating_duration_since(last) > STALE_KEY_TIMEOUT {
                    self.release_except(&[], now);
                    self.last_key_time = None;
                }
            }
        }

        self.visualizer.tick(now);
        if self.screen == AppScreen::Quiz {
            self.quiz.tick(now);
            if self.quiz.state().status == QuizStatus::Finished {
                self.finish_quiz();
            }
        }
    }

    pub fn go_to_visualizer(&mut self) {
        self.quiz.blur();
        self.screen = AppScreen::Visualizer;
    }

    pub fn start_quiz(&mut self, now: Instant) {
        let indexes: Vec<ShortcutIndex> = self
            .config
            .apps
            .iter()
            .map(|id| load_index(id, &self.ctx).1)
            .collect();
        self.start_quiz_over(indexes, now);
    }

    pub fn start_quiz_over(&mut self, indexes: Vec<ShortcutIndex>, now: Instant) {
        self.visualizer.blur();
        info!(
            "starting quiz over {} ({} shortcuts)",
            self.config.apps.join(", "),
            indexes.iter().map(ShortcutIndex::len).sum::<usize>()
        );
        let mut settings = self.config.quiz_settings();
        settings.fullscreen = self.fullscreen;
        settings.reserved = quiz_command_combos();
        self.quiz = QuizSession::new(indexes, self.ctx.clone());
        self.quiz.start(settings, now);
        self.screen = AppScreen::Quiz;
        if self.quiz.state().status == QuizStatus::Finished {
            self.finish_quiz();
        }
    }

    fn finish_quiz(&mut self) {
        let result = QuizResult::from_state(self.quiz.state());
        if let Some(path) = &self.summary_path {
            if let Err(err) = write_summary(path, &result) {
                warn!("could not write quiz summary to {}: {err}", path.display());
            }
        }
        self.last_result = Some(result);
        self.screen = AppScreen::QuizResult;
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        match self.quiz.state().status {
            QuizStatus::Playing => self.quiz.pause(now),
            QuizStatus::Paused => self.quiz.resume(now),
            _ => {}
        }
    }

    pub fn toggle_fullscreen(&mut self, now: Instant) {
        self.fullscreen = !self.fullscreen;
        info!("keyboard lock {}", if self.fullscreen { "on" } else { "off" });
        self.quiz.set_fullscreen(self.fullscreen, now);
    }

    pub fn next_catalog(&mut self) {
        if self.catalogs.is_empty() {
            return;
        }
        self.catalog_selected = (self.catalog_selected + 1) % self.catalogs.len();
        let (name, index) = load_index(&self.catalogs[self.catalog_selected], &self.ctx);
        self.catalog_name = name;
        self.visualizer.set_index(index);
    }

    /// Keys to show as "your answer" on the quiz screen.
    pub fn quiz_typed(&self) -> Vec<CanonicalToken> {
        let steps = self.quiz.capture().steps();
        if steps.is_empty() {
            self.quiz.pressed().tokens(&self.ctx)
        } else {
            steps.to_vec()
        }
    }
}

/// Load a catalog and index it for the context's OS. Failures degrade to an empty index.
fn load_index(id: &str, ctx: &KeyContext) -> (String, ShortcutIndex) {
    match ShortcutCatalog::load(id, Some(&ShortcutCatalog::user_dir())) {
        Ok(catalog) => (catalog.name.clone(), catalog.index(id, ctx.os)),
        Err(err) => {
            warn!("{err}");
            (id.to_string(), ShortcutIndex::from_records(id, ctx.os, Vec::new()))
        }
    }
}

pub fn write_summary(path: &Path, result: &QuizResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(result)?)?;
    Ok(())
}
