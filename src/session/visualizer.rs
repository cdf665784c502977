use std::time::Instant;

use crate::engine::index::ShortcutIndex;
use crate::engine::matcher::{MatchEngine, MatchOutcome};
use crate::engine::protection::ProtectionLevel;
use crate::engine::shortcut::ShortcutRecord;
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::token::{CanonicalToken, KeyContext, canonical_token};
use crate::session::history::ComboHistory;
use crate::session::press::{KeyInput, KeyOutcome, PressListener, PressTracker, PressedKeys};

/// What the visualizer screen shows for the current key state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualizerView {
    pub pressed: Vec<CanonicalToken>,
    pub combo: NormalizedCombo,
    pub matched: Option<ShortcutRecord>,
    pub available: Vec<ShortcutRecord>,
    /// Steps of a sequential combo typed so far.
    pub sequence: Vec<CanonicalToken>,
}

/// Match state driven by [`PressTracker`] callbacks.
#[derive(Clone, Debug)]
pub struct VisualizerState {
    index: ShortcutIndex,
    engine: MatchEngine,
    history: ComboHistory,
    ctx: KeyContext,
    view: VisualizerView,
}

impl VisualizerState {
    pub fn new(index: ShortcutIndex, engine: MatchEngine, history: ComboHistory, ctx: KeyContext) -> Self {
        Self {
            index,
            engine,
            history,
            ctx,
            view: VisualizerView::default(),
        }
    }

    fn refresh(&mut self, pressed: Vec<CanonicalToken>) {
        let outcome = self.engine.lookup(&self.index, &pressed);
        let (matched, available) = match outcome {
            MatchOutcome::Exact(record) => (Some(record.clone()), Vec::new()),
            MatchOutcome::Available(list) => (None, list.into_iter().cloned().collect()),
            MatchOutcome::NoMatch => (None, Vec::new()),
        };
        if let Some(record) = &matched {
            self.history.push(record.combo.clone(), &record.description);
        }
        self.view = VisualizerView {
            combo: NormalizedCombo::from_tokens(&pressed),
            pressed,
            matched,
            available,
            sequence: self.engine.progress().to_vec(),
        };
    }

    fn clear(&mut self) {
        self.engine.reset();
        self.view = VisualizerView::default();
    }
}

impl PressListener for VisualizerState {
    fn on_key_down(&mut self, event: &KeyInput, pressed: &PressedKeys, repeat: bool) {
        if repeat {
            return;
        }
        let held = pressed.tokens(&self.ctx);
        let token = canonical_token(&event.code, &self.ctx);
        let completed = self
            .engine
            .step(&self.index, &token, &held, event.at)
            .cloned();
        self.refresh(held);
        if let Some(record) = completed {
            self.history.push(record.combo.clone(), &record.description);
            self.view.matched = Some(record);
        }
    }

    fn on_key_up(&mut self, event: &KeyInput, pressed: &PressedKeys) {
        let released = canonical_token(&event.code, &self.ctx);
        let remaining: Vec<CanonicalToken> = pressed
            .codes()
            .iter()
            .filter(|code| **code != event.code)
            .map(|code| canonical_token(code, &self.ctx))
            .fold(Vec::new(), |mut acc, token| {
                if !acc.contains(&token) {
                    acc.push(token);
                }
                acc
            });
        // A completed sequence stays on screen until the next key goes down.
        let keep_sequence_match = self
            .view
            .matched
            .as_ref()
            .is_some_and(|r| r.is_sequential() && !released.is_modifier());
        let matched = self.view.matched.take();
        self.refresh(remaining);
        if keep_sequence_match && self.view.matched.is_none() {
            self.view.matched = matched;
        }
    }

    /// Focus loss ends the press session: keys, sequence progress and history.
    fn on_blur(&mut self) {
        self.clear();
        self.history.clear();
    }

    fn should_prevent_default(&self, event: &KeyInput, _pressed: &PressedKeys) -> bool {
        let navigation = matches!(
            event.code.as_str(),
            "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "Space" | "Tab"
        );
        let capturable = self
            .view
            .matched
            .as_ref()
            .is_some_and(|r| self.index.protection(r) == ProtectionLevel::None);
        navigation || capturable
    }
}

/// Live shortcut visualizer for one application.
#[derive(Clone, Debug)]
pub struct Visualizer {
    tracker: PressTracker,
    state: VisualizerState,
}

impl Visualizer {
    pub fn new(index: ShortcutIndex, engine: MatchEngine, history: ComboHistory, ctx: KeyContext) -> Self {
        Self {
            tracker: PressTracker::new(),
            state: VisualizerState::new(index, engine, history, ctx),
        }
    }

    pub fn key_down(&mut self, code: &str, at: Instant) -> KeyOutcome {
        self.tracker.key_down(&KeyInput::new(code, at), &mut self.state)
    }

    pub fn key_up(&mut self, code: &str, at: Instant) -> KeyOutcome {
        self.tracker.key_up(&KeyInput::new(code, at), &mut self.state)
    }

    pub fn blur(&mut self) {
        self.tracker.blur(&mut self.state);
    }

    /// Expire stale sequence progress.
    pub fn tick(&mut self, now: Instant) {
        let before = self.state.engine.progress().len();
        self.state.engine.expire(now);
        if self.state.engine.progress().len() != before {
            self.state.view.sequence.clear();
        }
    }

    /// Switch to another application's shortcuts, dropping all key state.
    pub fn set_index(&mut self, index: ShortcutIndex) {
        self.tracker.blur(&mut ());
        self.state.index = index;
        self.state.clear();
        self.state.history.clear();
    }

    pub fn view(&self) -> &VisualizerView {
        &self.state.view
    }

    pub fn history(&self) -> &ComboHistory {
        &self.state.history
    }

    pub fn index(&self) -> &ShortcutIndex {
        &self.state.index
    }

    pub fn pressed(&self) -> &PressedKeys {
        self.tracker.pressed()
    }

    pub fn protection(&self, record: &ShortcutRecord) -> ProtectionLevel {
        self.state.index.protection(record)
    }
}
