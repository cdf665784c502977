use std::time::{Duration, Instant};

use log::debug;

use crate::engine::index::ShortcutIndex;
use crate::engine::shortcut::ShortcutRecord;
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::token::CanonicalToken;

/// Upper bound on "available shortcuts" returned while only modifiers are held.
pub const DEFAULT_AVAILABLE_LIMIT: usize = 60;

#[derive(Debug, PartialEq)]
pub enum MatchOutcome<'a> {
    /// The held keys form a complete simultaneous shortcut.
    Exact(&'a ShortcutRecord),
    /// Only modifiers are held and they are not a shortcut themselves; these
    /// shortcuts start with them.
    Available(Vec<&'a ShortcutRecord>),
    NoMatch,
}

/// In-flight sequential combo ("g then i").
#[derive(Clone, Debug, Default)]
struct SequenceProgress {
    steps: Vec<CanonicalToken>,
    modifiers: NormalizedCombo,
    last_step_at: Option<Instant>,
}

impl SequenceProgress {
    fn clear(&mut self) {
        self.steps.clear();
        self.modifiers = NormalizedCombo::empty();
        self.last_step_at = None;
    }
}

/// Resolves held keys against a [`ShortcutIndex`].
#[derive(Clone, Debug)]
pub struct MatchEngine {
    available_limit: usize,
    sequence_timeout: Duration,
    progress: SequenceProgress,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_AVAILABLE_LIMIT, Duration::from_millis(1000))
    }
}

impl MatchEngine {
    pub fn new(available_limit: usize, sequence_timeout: Duration) -> Self {
        Self {
            available_limit,
            sequence_timeout,
            progress: SequenceProgress::default(),
        }
    }

    /// Match the currently held keys. A modifier-only set is exact when a
    /// record binds exactly those modifiers (`Ctrl+Shift`), otherwise it lists
    /// the shortcuts it starts. Sequential records are only reported by
    /// [`Self::step`].
    pub fn lookup<'a>(&self, index: &'a ShortcutIndex, pressed: &[CanonicalToken]) -> MatchOutcome<'a> {
        let combo = NormalizedCombo::from_tokens(pressed);
        if combo.is_empty() {
            return MatchOutcome::NoMatch;
        }
        match index.get(&combo) {
            Some(record) if !record.is_sequential() => MatchOutcome::Exact(record),
            _ if combo.is_modifier_only() => {
                MatchOutcome::Available(index.with_prefix(&combo, self.available_limit))
            }
            _ => MatchOutcome::NoMatch,
        }
    }

    /// Feed a key-down into sequential matching.
    ///
    /// `held` is the full pressed set including `token`. A step only counts
    /// when no other main key is held. The modifiers held at the first step
    /// select the sequence (`Shift+8+A` is Shift with 8, then A); modifiers
    /// held or released on later steps are ignored. Returns the record once
    /// its last step lands.
    pub fn step<'a>(
        &mut self,
        index: &'a ShortcutIndex,
        token: &CanonicalToken,
        held: &[CanonicalToken],
        at: Instant,
    ) -> Option<&'a ShortcutRecord> {
        self.expire(at);
        if token.is_modifier() {
            return None;
        }
        if index.sequential().next().is_none() {
            return None;
        }

        let overlapping = held.iter().any(|t| !t.is_modifier() && t != token);
        if overlapping {
            self.progress.clear();
            return None;
        }

        let held_modifiers: Vec<CanonicalToken> =
            held.iter().filter(|t| t.is_modifier()).cloned().collect();
        let held_modifiers = NormalizedCombo::from_tokens(&held_modifiers);

        let mut candidate = self.progress.steps.clone();
        candidate.push(token.clone());
        if self.progress.steps.is_empty() || !self.continues_any(index, &candidate) {
            if !self.progress.steps.is_empty() {
                debug!("sequence {:?} broken by {token}", self.progress.steps);
            }
            self.progress.clear();
            self.progress.modifiers = held_modifiers;
            candidate = vec![token.clone()];
            if !self.continues_any(index, &candidate) {
                self.progress.clear();
                return None;
            }
        }

        if let Some(record) = self.completes(index, &candidate) {
            self.progress.clear();
            return Some(record);
        }
        self.progress.steps = candidate;
        self.progress.last_step_at = Some(at);
        None
    }

    /// Drop sequence progress older than the inter-key timeout.
    pub fn expire(&mut self, now: Instant) {
        if let Some(last) = self.progress.last_step_at {
            if now.saturating_duration_since(last) > self.sequence_timeout {
                debug!("sequence {:?} timed out", self.progress.steps);
                self.progress.clear();
            }
        }
    }

    pub fn reset(&mut self) {
        self.progress.clear();
    }

    pub fn progress(&self) -> &[CanonicalToken] {
        &self.progress.steps
    }

    fn sequence_candidates<'a>(
        &self,
        index: &'a ShortcutIndex,
    ) -> impl Iterator<Item = &'a ShortcutRecord> {
        index
            .sequential()
            .filter(move |r| r.combo.modifier_prefix() == self.progress.modifiers)
    }

    fn continues_any(&self, index: &ShortcutIndex, steps: &[CanonicalToken]) -> bool {
        self.sequence_candidates(index).any(|r| {
            let mains = r.combo.main_keys();
            mains.len() >= steps.len() && steps.iter().zip(&mains).all(|(s, m)| s.as_str() == *m)
        })
    }

    fn completes<'a>(
        &self,
        index: &'a ShortcutIndex,
        steps: &[CanonicalToken],
    ) -> Option<&'a ShortcutRecord> {
        self.sequence_candidates(index).find(|r| {
            let mains = r.combo.main_keys();
            mains.len() == steps.len() && steps.iter().zip(&mains).all(|(s, m)| s.as_str() == *m)
        })
    }
}
