use std::time::Instant;

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::engine::index::ShortcutIndex;
use crate::generator::question::{QuestionFilter, QuestionGenerator, RandomQuestionGenerator};
use crate::keyboard::token::KeyContext;
use crate::session::answer::AnswerCapture;
use crate::session::press::{KeyInput, KeyOutcome, PressTracker, PressedKeys};
use crate::session::quiz::{QuizAction, QuizEffect, QuizSettings, QuizState, QuizStatus};
use crate::session::timer::QuizTimer;

/// Runs the quiz reducer against real shortcut data, randomness and time.
pub struct QuizSession<G: QuestionGenerator = RandomQuestionGenerator<SmallRng>> {
    state: QuizState,
    indexes: Vec<ShortcutIndex>,
    generator: G,
    timer: QuizTimer,
    tracker: PressTracker,
    capture: AnswerCapture,
}

impl QuizSession<RandomQuestionGenerator<SmallRng>> {
    pub fn new(indexes: Vec<ShortcutIndex>, ctx: KeyContext) -> Self {
        Self::with_generator(
            indexes,
            RandomQuestionGenerator::new(SmallRng::from_entropy()),
            ctx,
        )
    }

    /// Deterministic question order, for tests and replays.
    pub fn seeded(indexes: Vec<ShortcutIndex>, ctx: KeyContext, seed: u64) -> Self {
        Self::with_generator(
            indexes,
            RandomQuestionGenerator::new(SmallRng::seed_from_u64(seed)),
            ctx,
        )
    }
}

impl<G: QuestionGenerator> QuizSession<G> {
    pub fn with_generator(indexes: Vec<ShortcutIndex>, generator: G, ctx: KeyContext) -> Self {
        Self {
            state: QuizState::default(),
            indexes,
            generator,
            timer: QuizTimer::new(),
            tracker: PressTracker::new(),
            capture: AnswerCapture::new(ctx),
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn indexes(&self) -> &[ShortcutIndex] {
        &self.indexes
    }

    pub fn pressed(&self) -> &PressedKeys {
        self.tracker.pressed()
    }

    pub fn capture(&self) -> &AnswerCapture {
        &self.capture
    }

    pub fn start(&mut self, settings: QuizSettings, now: Instant) {
        for index in self.indexes.iter().filter(|index| index.os() != settings.os) {
            warn!(
                "{} was indexed for {} but the quiz runs as {}; protection follows the quiz",
                index.app(),
                index.os().as_str(),
                settings.os.as_str()
            );
        }
        self.dispatch(QuizAction::Start(settings), now);
    }

    /// Apply `action` and keep fulfilling question requests until the reducer settles.
    pub fn dispatch(&mut self, action: QuizAction, now: Instant) {
        debug!("quiz {:?}: {}", self.state.status, action_name(&action));
        let mut effect = self.state.apply(action);
        while let Some(QuizEffect::RequestQuestion) = effect {
            effect = self.fulfil(now);
        }
        if self.state.status != QuizStatus::Playing {
            self.timer.stop();
        }
    }

    fn fulfil(&mut self, now: Instant) -> Option<QuizEffect> {
        let filter = QuestionFilter::from_settings(&self.state.settings);
        match self
            .generator
            .next_question(&self.indexes, &filter, &self.state.used)
        {
            Some(question) => {
                debug!("next question: {}", question.combo());
                self.capture.arm(&question);
                self.timer.restart(now);
                self.state.apply(QuizAction::QuestionReady(question))
            }
            None if !self.state.used.is_empty() && !self.state.recycled => {
                debug!("question pool exhausted, recycling {} combos", self.state.used.len());
                self.state.apply(QuizAction::Recycle)
            }
            None => {
                debug!("no answerable questions left");
                self.state.apply(QuizAction::NoQuestions)
            }
        }
    }

    /// Advance the question clock. Call on every host tick.
    pub fn tick(&mut self, now: Instant) {
        let running = self.state.status == QuizStatus::Playing && self.state.current.is_some();
        if let Some(elapsed) = self.timer.elapsed(now, running) {
            self.dispatch(QuizAction::Tick(elapsed), now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        self.dispatch(QuizAction::Pause, now);
    }

    pub fn resume(&mut self, now: Instant) {
        self.dispatch(QuizAction::Resume, now);
        self.timer.restart(now);
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool, now: Instant) {
        self.dispatch(QuizAction::UpdateFullscreen(fullscreen), now);
    }

    pub fn key_down(&mut self, code: &str, at: Instant) -> KeyOutcome {
        let event = KeyInput::new(code, at);
        if self.state.status != QuizStatus::Playing {
            return self.tracker.key_down(&event, &mut ());
        }
        let outcome = self.tracker.key_down(&event, &mut self.capture);
        if let Some(answer) = self.capture.take() {
            self.dispatch(QuizAction::Answer(answer), at);
        }
        outcome
    }

    /// Key release. Answers made of modifiers alone are submitted here.
    pub fn key_up(&mut self, code: &str, at: Instant) -> KeyOutcome {
        let event = KeyInput::new(code, at);
        if self.state.status != QuizStatus::Playing {
            return self.tracker.key_up(&event, &mut ());
        }
        let outcome = self.tracker.key_up(&event, &mut self.capture);
        if let Some(answer) = self.capture.take() {
            self.dispatch(QuizAction::Answer(answer), at);
        }
        outcome
    }

    pub fn blur(&mut self) {
        self.tracker.blur(&mut self.capture);
    }
}

fn action_name(action: &QuizAction) -> &'static str {
    match action {
        QuizAction::Start(_) => "start",
        QuizAction::QuestionReady(_) => "question ready",
        QuizAction::NoQuestions => "no questions",
        QuizAction::Recycle => "recycle",
        QuizAction::Answer(_) => "answer",
        QuizAction::Timeout => "timeout",
        QuizAction::Tick(_) => "tick",
        QuizAction::Pause => "pause",
        QuizAction::Resume => "resume",
        QuizAction::UpdateFullscreen(_) => "update fullscreen",
        QuizAction::Reset => "reset",
    }
}
