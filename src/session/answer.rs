use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::token::{CanonicalToken, KeyContext, canonical_token};
use crate::session::press::{KeyInput, PressListener, PressedKeys};
use crate::session::quiz::QuizQuestion;

/// An answer is correct when it normalizes to the target combo.
pub fn check_answer(user: &NormalizedCombo, target: &NormalizedCombo) -> bool {
    user == target
}

/// Turns quiz key presses into a submitted combo.
///
/// A simultaneous answer is submitted when a main key goes down, using
/// everything held at that moment. A sequential answer collects one main key
/// per press until it has as many steps as the question; modifiers are taken
/// from the first step. When the question is modifiers alone (`Alt+Shift`)
/// there is no main key to wait for, so the held set is submitted when the
/// first modifier is released.
#[derive(Clone, Debug, Default)]
pub struct AnswerCapture {
    ctx: KeyContext,
    expected_steps: usize,
    modifier_only: bool,
    /// A main key went down or an answer was already taken from the keys
    /// still held; releasing them must not submit again.
    chord_spent: bool,
    steps: Vec<CanonicalToken>,
    modifiers: Vec<CanonicalToken>,
    submitted: Option<NormalizedCombo>,
}

impl AnswerCapture {
    pub fn new(ctx: KeyContext) -> Self {
        Self {
            ctx,
            expected_steps: 1,
            ..Self::default()
        }
    }

    /// Prepare for a new question, discarding any partial answer.
    pub fn arm(&mut self, question: &QuizQuestion) {
        self.expected_steps = if question.record.is_sequential() {
            question.combo().main_keys().len().max(1)
        } else {
            1
        };
        self.modifier_only = question.combo().is_modifier_only();
        self.clear();
    }

    /// Take the submitted answer, if one is complete.
    pub fn take(&mut self) -> Option<NormalizedCombo> {
        self.submitted.take()
    }

    /// Steps typed so far for a sequential answer.
    pub fn steps(&self) -> &[CanonicalToken] {
        &self.steps
    }

    fn clear(&mut self) {
        self.steps.clear();
        self.modifiers.clear();
        self.submitted = None;
    }
}

impl PressListener for AnswerCapture {
    fn on_key_down(&mut self, event: &KeyInput, pressed: &PressedKeys, repeat: bool) {
        if repeat {
            return;
        }
        let token = canonical_token(&event.code, &self.ctx);
        if token.is_modifier() {
            return;
        }
        self.chord_spent = true;
        let held = pressed.tokens(&self.ctx);

        if self.expected_steps <= 1 {
            self.submitted = Some(NormalizedCombo::from_tokens(&held));
            return;
        }

        if self.steps.is_empty() {
            self.modifiers = held.iter().filter(|t| t.is_modifier()).cloned().collect();
        }
        self.steps.push(token);
        if self.steps.len() >= self.expected_steps {
            let mut tokens = self.modifiers.clone();
            tokens.extend(self.steps.drain(..));
            self.modifiers.clear();
            self.submitted = Some(NormalizedCombo::from_tokens(&tokens));
        }
    }

    fn on_key_up(&mut self, event: &KeyInput, pressed: &PressedKeys) {
        let last_key = pressed.len() <= 1;
        if self.modifier_only && !self.chord_spent {
            let held = pressed.tokens(&self.ctx);
            let released = canonical_token(&event.code, &self.ctx);
            if released.is_modifier() && held.iter().all(CanonicalToken::is_modifier) {
                self.submitted = Some(NormalizedCombo::from_tokens(&held));
                self.chord_spent = true;
            }
        }
        if last_key {
            self.chord_spent = false;
        }
    }

    fn on_blur(&mut self) {
        self.chord_spent = false;
        self.clear();
    }

    fn should_prevent_default(&self, _event: &KeyInput, _pressed: &PressedKeys) -> bool {
        true
    }
}
