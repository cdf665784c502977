use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::index::ShortcutIndex;
use crate::engine::protection::ProtectionLevel;
use crate::engine::shortcut::{Difficulty, ShortcutRecord};
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::platform::Os;
use crate::session::quiz::{QuizMode, QuizQuestion, QuizSettings};

/// Whether a player can physically produce a combo at `level` and have it captured.
pub fn answerable(level: ProtectionLevel, fullscreen: bool, mode: QuizMode) -> bool {
    level.is_capturable(fullscreen || mode == QuizMode::Hardcore)
}

/// Which records may be asked.
///
/// Protection is judged on the quiz OS, not the OS an index was built for, and
/// combos the host reserves count as always protected.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionFilter {
    pub difficulty: Option<Difficulty>,
    pub mode: QuizMode,
    pub fullscreen: bool,
    pub os: Os,
    pub reserved: HashSet<NormalizedCombo>,
}

impl QuestionFilter {
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self {
            difficulty: settings.difficulty,
            mode: settings.mode,
            fullscreen: settings.fullscreen,
            os: settings.os,
            reserved: settings.reserved.iter().cloned().collect(),
        }
    }

    pub fn protection(&self, record: &ShortcutRecord) -> ProtectionLevel {
        if self.reserved.contains(&record.combo) {
            return ProtectionLevel::AlwaysProtected;
        }
        record.protection_on(self.os)
    }

    pub fn is_allowed(&self, record: &ShortcutRecord) -> bool {
        if self.difficulty.is_some_and(|d| d != record.difficulty) {
            return false;
        }
        answerable(self.protection(record), self.fullscreen, self.mode)
    }
}

pub trait QuestionGenerator {
    /// Pick an allowed record whose combo is not in `used`, or `None` if the pool is empty.
    fn next_question(
        &mut self,
        indexes: &[ShortcutIndex],
        filter: &QuestionFilter,
        used: &HashSet<NormalizedCombo>,
    ) -> Option<QuizQuestion>;
}

/// Uniform choice over the whole eligible pool.
pub struct RandomQuestionGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomQuestionGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> QuestionGenerator for RandomQuestionGenerator<R> {
    fn next_question(
        &mut self,
        indexes: &[ShortcutIndex],
        filter: &QuestionFilter,
        used: &HashSet<NormalizedCombo>,
    ) -> Option<QuizQuestion> {
        let pool: Vec<&ShortcutRecord> = indexes
            .iter()
            .flat_map(|index| index.records())
            .filter(|record| !used.contains(&record.combo) && filter.is_allowed(record))
            .collect();
        let record = *pool.choose(&mut self.rng)?;
        Some(QuizQuestion {
            record: record.clone(),
            protection: filter.protection(record),
        })
    }
}
