//! Live set of held keys.
//!
//! The tracker only knows physical codes. Everything that interprets them
//! (matching, quiz answers) hangs off a [`PressListener`] that the host passes
//! in on every call, so a listener never has to outlive the view that owns it.

use std::time::Instant;

use log::debug;

use crate::keyboard::token::{CanonicalToken, KeyContext, canonical_token};

/// Most keys a keyboard reports at once; extra key-downs are ignored.
pub const MAX_PRESSED: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    /// Physical key code, e.g. `ControlLeft`, `KeyA`.
    pub code: String,
    pub at: Instant,
}

impl KeyInput {
    pub fn new(code: impl Into<String>, at: Instant) -> Self {
        Self {
            code: code.into(),
            at,
        }
    }
}

/// Held physical codes in the order they went down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys {
    codes: Vec<String>,
}

impl PressedKeys {
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Canonical tokens of the held keys, in press order, without duplicates
    /// (`ShiftLeft` and `ShiftRight` both read as one `Shift`).
    pub fn tokens(&self, ctx: &KeyContext) -> Vec<CanonicalToken> {
        let mut out: Vec<CanonicalToken> = Vec::with_capacity(self.codes.len());
        for code in &self.codes {
            let token = canonical_token(code, ctx);
            if !out.contains(&token) {
                out.push(token);
            }
        }
        out
    }

    fn insert(&mut self, code: &str) -> bool {
        if self.contains(code) || self.codes.len() >= MAX_PRESSED {
            return false;
        }
        self.codes.push(code.to_string());
        true
    }

    fn remove(&mut self, code: &str) -> bool {
        match self.codes.iter().position(|c| c == code) {
            Some(pos) => {
                self.codes.remove(pos);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.codes.clear();
    }
}

/// Callbacks fired by [`PressTracker`]. Every method has a no-op default.
pub trait PressListener {
    /// Fired on every key-down, repeats included. `pressed` already contains the key.
    fn on_key_down(&mut self, _event: &KeyInput, _pressed: &PressedKeys, _repeat: bool) {}

    /// Fired on every key-up with the set as it was before the key is removed.
    fn on_key_up(&mut self, _event: &KeyInput, _pressed: &PressedKeys) {}

    fn on_blur(&mut self) {}

    /// Whether the host should swallow the event instead of passing it on.
    fn should_prevent_default(&self, _event: &KeyInput, _pressed: &PressedKeys) -> bool {
        false
    }
}

impl PressListener for () {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub prevent_default: bool,
    /// The key was already held (auto-repeat); the pressed set did not change.
    pub repeat: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PressTracker {
    pressed: PressedKeys,
}

impl PressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed(&self) -> &PressedKeys {
        &self.pressed
    }

    pub fn key_down<L: PressListener + ?Sized>(
        &mut self,
        event: &KeyInput,
        listener: &mut L,
    ) -> KeyOutcome {
        let repeat = self.pressed.contains(&event.code);
        if !repeat && !self.pressed.insert(&event.code) {
            debug!("pressed set full, ignoring {}", event.code);
            return KeyOutcome::default();
        }
        listener.on_key_down(event, &self.pressed, repeat);
        KeyOutcome {
            prevent_default: listener.should_prevent_default(event, &self.pressed),
            repeat,
        }
    }

    pub fn key_up<L: PressListener + ?Sized>(
        &mut self,
        event: &KeyInput,
        listener: &mut L,
    ) -> KeyOutcome {
        listener.on_key_up(event, &self.pressed);
        let prevent_default = listener.should_prevent_default(event, &self.pressed);
        self.pressed.remove(&event.code);
        KeyOutcome {
            prevent_default,
            repeat: false,
        }
    }

    /// Focus lost: drop every held key so nothing stays stuck.
    pub fn blur<L: PressListener + ?Sized>(&mut self, listener: &mut L) {
        if !self.pressed.is_empty() {
            debug!("blur cleared {} held keys", self.pressed.len());
        }
        self.pressed.clear();
        listener.on_blur();
    }
}
