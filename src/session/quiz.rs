//! Quiz lifecycle as a pure reducer.
//!
//! `QuizState::apply` never touches randomness, clocks or shortcut data. When
//! it needs a new question it returns [`QuizEffect::RequestQuestion`] and the
//! owner (see `quiz_session`) answers with `QuestionReady`, `Recycle` or
//! `NoQuestions`.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::protection::ProtectionLevel;
use crate::engine::shortcut::{Difficulty, ShortcutRecord};
use crate::generator::question::answerable;
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::platform::Os;
use crate::session::answer::check_answer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Fullscreen-preventable shortcuts only come up while keyboard lock is active.
    #[default]
    Casual,
    /// Assumes the player has keyboard lock; fullscreen-preventable shortcuts are always fair.
    Hardcore,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Casual => "casual",
            QuizMode::Hardcore => "hardcore",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "casual" => Some(QuizMode::Casual),
            "hardcore" => Some(QuizMode::Hardcore),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Completed,
    NoQuestions,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuizSettings {
    pub apps: Vec<String>,
    /// `None` quizzes every difficulty.
    pub difficulty: Option<Difficulty>,
    pub mode: QuizMode,
    pub os: Os,
    /// Answers before the quiz finishes; 0 plays until the pool runs dry.
    pub total_questions: usize,
    pub time_limit: Duration,
    pub fullscreen: bool,
    /// Combos the host keeps for its own commands; never asked.
    pub reserved: Vec<NormalizedCombo>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            difficulty: None,
            mode: QuizMode::default(),
            os: Os::detect(),
            total_questions: 10,
            time_limit: Duration::from_secs(15),
            fullscreen: false,
            reserved: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub record: ShortcutRecord,
    /// Effective protection of the record on the quiz OS.
    pub protection: ProtectionLevel,
}

impl QuizQuestion {
    pub fn combo(&self) -> &NormalizedCombo {
        &self.record.combo
    }

    pub fn prompt(&self) -> &str {
        &self.record.description
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAnswer {
    Combo(NormalizedCombo),
    TimedOut,
}

impl fmt::Display for UserAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAnswer::Combo(combo) => write!(f, "{combo}"),
            UserAnswer::TimedOut => f.write_str("timed out"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: QuizQuestion,
    pub correct_combo: NormalizedCombo,
    pub answer: UserAnswer,
    pub is_correct: bool,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QuizAction {
    Start(QuizSettings),
    QuestionReady(QuizQuestion),
    /// Pool is empty even after recycling.
    NoQuestions,
    /// Forget which combos were asked so the pool refills.
    Recycle,
    Answer(NormalizedCombo),
    Timeout,
    Tick(Duration),
    Pause,
    Resume,
    UpdateFullscreen(bool),
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizEffect {
    RequestQuestion,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuizState {
    pub status: QuizStatus,
    pub settings: QuizSettings,
    pub used: HashSet<NormalizedCombo>,
    pub current: Option<QuizQuestion>,
    pub score: usize,
    pub history: Vec<AnsweredQuestion>,
    pub time_remaining: Duration,
    pub finish_reason: Option<FinishReason>,
    /// Set by `Recycle`, cleared once a question arrives; limits recycling to once per request.
    pub recycled: bool,
}

impl QuizState {
    pub fn apply(&mut self, action: QuizAction) -> Option<QuizEffect> {
        match action {
            QuizAction::Start(settings) => {
                // A running or paused quiz must be reset before another starts.
                if self.is_active() {
                    return None;
                }
                let time_limit = settings.time_limit;
                *self = QuizState {
                    status: QuizStatus::Playing,
                    settings,
                    time_remaining: time_limit,
                    ..QuizState::default()
                };
                Some(QuizEffect::RequestQuestion)
            }
            QuizAction::QuestionReady(question) => {
                if !self.is_active() {
                    return None;
                }
                self.used.insert(question.combo().clone());
                self.current = Some(question);
                self.time_remaining = self.settings.time_limit;
                self.recycled = false;
                None
            }
            QuizAction::NoQuestions => {
                if self.is_active() {
                    self.finish(FinishReason::NoQuestions);
                }
                None
            }
            QuizAction::Recycle => {
                if !self.is_active() {
                    return None;
                }
                self.used.clear();
                self.recycled = true;
                Some(QuizEffect::RequestQuestion)
            }
            QuizAction::Answer(combo) => {
                if self.status != QuizStatus::Playing {
                    return None;
                }
                self.record_answer(UserAnswer::Combo(combo))
            }
            QuizAction::Timeout => {
                if self.status != QuizStatus::Playing {
                    return None;
                }
                self.record_answer(UserAnswer::TimedOut)
            }
            QuizAction::Tick(elapsed) => {
                if self.status != QuizStatus::Playing || self.current.is_none() {
                    return None;
                }
                self.time_remaining = self.time_remaining.saturating_sub(elapsed);
                if self.time_remaining.is_zero() {
                    return self.record_answer(UserAnswer::TimedOut);
                }
                None
            }
            QuizAction::Pause => {
                if self.status == QuizStatus::Playing {
                    self.status = QuizStatus::Paused;
                }
                None
            }
            QuizAction::Resume => {
                if self.status == QuizStatus::Paused {
                    self.status = QuizStatus::Playing;
                }
                None
            }
            QuizAction::UpdateFullscreen(fullscreen) => {
                self.settings.fullscreen = fullscreen;
                if !self.is_active() {
                    return None;
                }
                let still_fair = self.current.as_ref().is_none_or(|q| {
                    answerable(q.protection, fullscreen, self.settings.mode)
                });
                if still_fair {
                    return None;
                }
                self.current = None;
                Some(QuizEffect::RequestQuestion)
            }
            QuizAction::Reset => {
                let settings = std::mem::take(&mut self.settings);
                *self = QuizState {
                    settings,
                    ..QuizState::default()
                };
                None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, QuizStatus::Playing | QuizStatus::Paused)
    }

    /// Questions answered so far (timeouts included).
    pub fn answered(&self) -> usize {
        self.history.len()
    }

    fn record_answer(&mut self, answer: UserAnswer) -> Option<QuizEffect> {
        let question = self.current.take()?;
        let correct_combo = question.combo().clone();
        let is_correct = match &answer {
            UserAnswer::Combo(combo) => check_answer(combo, &correct_combo),
            UserAnswer::TimedOut => false,
        };
        let elapsed = self.settings.time_limit.saturating_sub(self.time_remaining);
        if is_correct {
            self.score += 1;
        }
        self.history.push(AnsweredQuestion {
            question,
            correct_combo,
            answer,
            is_correct,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        let total = self.settings.total_questions;
        if total > 0 && self.history.len() >= total {
            self.finish(FinishReason::Completed);
            return None;
        }
        Some(QuizEffect::RequestQuestion)
    }

    fn finish(&mut self, reason: FinishReason) {
        self.status = QuizStatus::Finished;
        self.current = None;
        self.finish_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::combo::normalize;

    fn question(keys: &str, protection: ProtectionLevel) -> QuizQuestion {
        QuizQuestion {
            record: ShortcutRecord::simple("app", keys, keys),
            protection,
        }
    }

    fn playing(total: usize) -> QuizState {
        let mut state = QuizState::default();
        let effect = state.apply(QuizAction::Start(QuizSettings {
            total_questions: total,
            ..QuizSettings::default()
        }));
        assert_eq!(effect, Some(QuizEffect::RequestQuestion));
        state.apply(QuizAction::QuestionReady(question("Ctrl+C", ProtectionLevel::None)));
        state
    }

    #[test]
    fn test_start_requests_question() {
        let state = playing(10);
        assert_eq!(state.status, QuizStatus::Playing);
        assert_eq!(state.current.as_ref().unwrap().combo().as_str(), "Ctrl+C");
        assert!(state.used.contains(&normalize("Ctrl+C")));
        assert_eq!(state.time_remaining, Duration::from_secs(15));
    }

    #[test]
    fn test_correct_answer_scores() {
        let mut state = playing(10);
        let effect = state.apply(QuizAction::Answer(normalize("control+c")));
        assert_eq!(effect, Some(QuizEffect::RequestQuestion));
        assert_eq!(state.score, 1);
        assert!(state.history[0].is_correct);
        assert!(state.current.is_none());
    }

    #[test]
    fn test_wrong_answer_recorded() {
        let mut state = playing(10);
        state.apply(QuizAction::Answer(normalize("Ctrl+V")));
        assert_eq!(state.score, 0);
        let entry = &state.history[0];
        assert!(!entry.is_correct);
        assert_eq!(entry.answer, UserAnswer::Combo(normalize("Ctrl+V")));
        assert_eq!(entry.correct_combo.as_str(), "Ctrl+C");
    }

    #[test]
    fn test_timeout_records_sentinel() {
        let mut state = playing(10);
        state.apply(QuizAction::Timeout);
        assert_eq!(state.history[0].answer, UserAnswer::TimedOut);
        assert_eq!(state.history[0].answer.to_string(), "timed out");
        assert_eq!(state.history[0].elapsed_ms, 0);
    }

    #[test]
    fn test_tick_counts_down_then_times_out() {
        let mut state = playing(10);
        assert_eq!(state.apply(QuizAction::Tick(Duration::from_secs(5))), None);
        assert_eq!(state.time_remaining, Duration::from_secs(10));
        let effect = state.apply(QuizAction::Tick(Duration::from_secs(11)));
        assert_eq!(effect, Some(QuizEffect::RequestQuestion));
        assert_eq!(state.history[0].answer, UserAnswer::TimedOut);
        assert_eq!(state.history[0].elapsed_ms, 15_000);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = playing(10);
        state.apply(QuizAction::Tick(Duration::from_secs(3)));
        state.apply(QuizAction::Pause);
        assert_eq!(state.status, QuizStatus::Paused);
        let before = state.clone();

        state.apply(QuizAction::Tick(Duration::from_secs(3)));
        state.apply(QuizAction::Answer(normalize("Ctrl+C")));
        state.apply(QuizAction::Timeout);
        assert_eq!(state, before);

        state.apply(QuizAction::Resume);
        assert_eq!(state.status, QuizStatus::Playing);
        assert_eq!(state.time_remaining, Duration::from_secs(12));
        assert_eq!(state.current, before.current);
    }

    #[test]
    fn test_finishes_at_total() {
        let mut state = playing(2);
        state.apply(QuizAction::Answer(normalize("Ctrl+C")));
        state.apply(QuizAction::QuestionReady(question("Ctrl+V", ProtectionLevel::None)));
        let effect = state.apply(QuizAction::Answer(normalize("Ctrl+V")));
        assert_eq!(effect, None);
        assert_eq!(state.status, QuizStatus::Finished);
        assert_eq!(state.finish_reason, Some(FinishReason::Completed));
        assert_eq!(state.score, 2);
    }

    #[test]
    fn test_endless_when_total_is_zero() {
        let mut state = playing(0);
        for _ in 0..50 {
            state.apply(QuizAction::Timeout);
            state.apply(QuizAction::QuestionReady(question("Ctrl+C", ProtectionLevel::None)));
        }
        assert_eq!(state.status, QuizStatus::Playing);
    }

    #[test]
    fn test_recycle_then_no_questions() {
        let mut state = playing(10);
        state.apply(QuizAction::Answer(normalize("Ctrl+C")));
        assert_eq!(state.apply(QuizAction::Recycle), Some(QuizEffect::RequestQuestion));
        assert!(state.used.is_empty());
        assert!(state.recycled);
        state.apply(QuizAction::NoQuestions);
        assert_eq!(state.status, QuizStatus::Finished);
        assert_eq!(state.finish_reason, Some(FinishReason::NoQuestions));
    }

    #[test]
    fn test_fullscreen_exit_replaces_unfair_question() {
        let mut state = QuizState::default();
        state.apply(QuizAction::Start(QuizSettings {
            fullscreen: true,
            ..QuizSettings::default()
        }));
        state.apply(QuizAction::QuestionReady(question(
            "Ctrl+W",
            ProtectionLevel::FullscreenPreventable,
        )));
        assert_eq!(state.apply(QuizAction::UpdateFullscreen(true)), None);
        assert_eq!(
            state.apply(QuizAction::UpdateFullscreen(false)),
            Some(QuizEffect::RequestQuestion)
        );
        assert!(state.current.is_none());
        assert!(state.history.is_empty());
        assert!(!state.settings.fullscreen);
    }

    #[test]
    fn test_hardcore_keeps_question_outside_fullscreen() {
        let mut state = QuizState::default();
        state.apply(QuizAction::Start(QuizSettings {
            mode: QuizMode::Hardcore,
            ..QuizSettings::default()
        }));
        state.apply(QuizAction::QuestionReady(question(
            "Ctrl+W",
            ProtectionLevel::FullscreenPreventable,
        )));
        assert_eq!(state.apply(QuizAction::UpdateFullscreen(false)), None);
        assert!(state.current.is_some());
    }

    #[test]
    fn test_stale_question_ignored_when_idle() {
        let mut state = QuizState::default();
        state.apply(QuizAction::QuestionReady(question("Ctrl+C", ProtectionLevel::None)));
        assert!(state.current.is_none());
        assert_eq!(state.apply(QuizAction::Answer(normalize("Ctrl+C"))), None);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_start_ignored_while_active() {
        let mut state = playing(3);
        state.apply(QuizAction::Answer(normalize("Ctrl+C")));
        let restart = QuizSettings {
            total_questions: 50,
            ..QuizSettings::default()
        };
        assert_eq!(state.apply(QuizAction::Start(restart.clone())), None);
        assert_eq!(state.score, 1);
        assert_eq!(state.settings.total_questions, 3);

        state.apply(QuizAction::Pause);
        assert_eq!(state.apply(QuizAction::Start(restart.clone())), None);
        assert_eq!(state.status, QuizStatus::Paused);

        state.apply(QuizAction::Reset);
        assert_eq!(
            state.apply(QuizAction::Start(restart)),
            Some(QuizEffect::RequestQuestion)
        );
        assert_eq!(state.settings.total_questions, 50);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_start_allowed_after_finish() {
        let mut state = playing(1);
        state.apply(QuizAction::Answer(normalize("Ctrl+C")));
        assert_eq!(state.status, QuizStatus::Finished);
        assert_eq!(
            state.apply(QuizAction::Start(QuizSettings::default())),
            Some(QuizEffect::RequestQuestion)
        );
        assert_eq!(state.status, QuizStatus::Playing);
    }

    #[test]
    fn test_reset_keeps_settings() {
        let mut state = playing(3);
        state.apply(QuizAction::Answer(normalize("Ctrl+C")));
        state.apply(QuizAction::Reset);
        assert_eq!(state.status, QuizStatus::Idle);
        assert!(state.history.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.settings.total_questions, 3);
    }
}
