use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::shortcut::Difficulty;
use crate::keyboard::platform::Os;
use crate::session::quiz::{FinishReason, QuizMode, QuizState, UserAnswer};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizResult {
    pub apps: Vec<String>,
    pub os: Os,
    pub mode: QuizMode,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub score: usize,
    pub answered: usize,
    pub accuracy: f64,
    pub avg_answer_ms: f64,
    pub timed_out: usize,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<AnswerSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerSummary {
    pub description: String,
    pub correct_combo: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub elapsed_ms: u64,
}

impl QuizResult {
    pub fn from_state(state: &QuizState) -> Self {
        let answered = state.history.len();
        let timed_out = state
            .history
            .iter()
            .filter(|a| a.answer == UserAnswer::TimedOut)
            .count();
        let accuracy = if answered == 0 {
            0.0
        } else {
            state.score as f64 / answered as f64 * 100.0
        };
        let avg_answer_ms = if answered == 0 {
            0.0
        } else {
            state.history.iter().map(|a| a.elapsed_ms as f64).sum::<f64>() / answered as f64
        };

        let answers = state
            .history
            .iter()
            .map(|a| AnswerSummary {
                description: a.question.prompt().to_string(),
                correct_combo: a.correct_combo.display(state.settings.os),
                user_answer: match &a.answer {
                    UserAnswer::Combo(combo) => combo.display(state.settings.os),
                    UserAnswer::TimedOut => a.answer.to_string(),
                },
                is_correct: a.is_correct,
                elapsed_ms: a.elapsed_ms,
            })
            .collect();

        Self {
            apps: state.settings.apps.clone(),
            os: state.settings.os,
            mode: state.settings.mode,
            difficulty: state.settings.difficulty,
            score: state.score,
            answered,
            accuracy,
            avg_answer_ms,
            timed_out,
            finish_reason: state.finish_reason,
            timestamp: Utc::now(),
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::protection::ProtectionLevel;
    use crate::engine::shortcut::ShortcutRecord;
    use crate::keyboard::combo::normalize;
    use crate::session::quiz::{QuizAction, QuizQuestion, QuizSettings};

    fn question(keys: &str, description: &str) -> QuizQuestion {
        QuizQuestion {
            record: ShortcutRecord::simple("app", keys, description),
            protection: ProtectionLevel::None,
        }
    }

    #[test]
    fn test_summary_of_finished_quiz() {
        let mut state = QuizState::default();
        state.apply(QuizAction::Start(QuizSettings {
            apps: vec!["app".to_string()],
            os: Os::Macos,
            total_questions: 2,
            ..QuizSettings::default()
        }));
        state.apply(QuizAction::QuestionReady(question("Cmd+C", "Copy")));
        state.apply(QuizAction::Tick(Duration::from_secs(2)));
        state.apply(QuizAction::Answer(normalize("Meta+C")));
        state.apply(QuizAction::QuestionReady(question("Cmd+V", "Paste")));
        state.apply(QuizAction::Timeout);

        let result = QuizResult::from_state(&state);
        assert_eq!(result.score, 1);
        assert_eq!(result.answered, 2);
        assert_eq!(result.timed_out, 1);
        assert!((result.accuracy - 50.0).abs() < f64::EPSILON);
        assert!((result.avg_answer_ms - 1000.0).abs() < f64::EPSILON);
        assert_eq!(result.finish_reason, Some(FinishReason::Completed));
        assert_eq!(result.answers[0].correct_combo, "Cmd + C");
        assert_eq!(result.answers[1].user_answer, "timed out");
    }

    #[test]
    fn test_summary_serializes() {
        let result = QuizResult::from_state(&QuizState::default());
        let json = serde_json::to_string(&result).unwrap();
        let back: QuizResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.answered, 0);
        assert_eq!(back.accuracy, 0.0);
    }
}
