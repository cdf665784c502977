use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keyboard::layout::KeyboardLayout;
use crate::keyboard::platform::Os;

pub const CTRL: &str = "Ctrl";
pub const ALT: &str = "Alt";
pub const META: &str = "Meta";
pub const SHIFT: &str = "Shift";

/// Modifier tokens in canonical combo order.
pub const MODIFIER_ORDER: [&str; 4] = [CTRL, ALT, META, SHIFT];

/// Position of a modifier in [`MODIFIER_ORDER`], `None` for main keys.
pub fn modifier_rank(name: &str) -> Option<usize> {
    MODIFIER_ORDER.iter().position(|m| *m == name)
}

/// OS- and layout-independent name of a single key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalToken(String);

impl CanonicalToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_modifier(&self) -> bool {
        modifier_rank(&self.0).is_some()
    }
}

impl fmt::Display for CanonicalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Platform and layout a physical key code is interpreted under.
#[derive(Clone, Debug, Default)]
pub struct KeyContext {
    pub os: Os,
    pub layout: KeyboardLayout,
}

impl KeyContext {
    pub fn new(os: Os, layout: KeyboardLayout) -> Self {
        Self { os, layout }
    }
}

fn punctuation_glyph(code: &str) -> Option<char> {
    let glyph = match code {
        "Minus" => '-',
        "Equal" => '=',
        "BracketLeft" => '[',
        "BracketRight" => ']',
        "Backslash" | "IntlBackslash" => '\\',
        "Semicolon" => ';',
        "Quote" => '\'',
        "Backquote" => '`',
        "Comma" => ',',
        "Period" => '.',
        "Slash" => '/',
        _ => return None,
    };
    Some(glyph)
}

fn numpad_token(rest: &str) -> Option<&'static str> {
    let token = match rest {
        "Add" => "+",
        "Subtract" => "-",
        "Multiply" => "*",
        "Divide" => "/",
        "Decimal" => ".",
        "Comma" => ",",
        "Equal" => "=",
        "Enter" => "Enter",
        _ => return None,
    };
    Some(token)
}

fn glyph_token(ch: char) -> CanonicalToken {
    if ch.is_ascii_alphabetic() {
        CanonicalToken::new(ch.to_ascii_uppercase().to_string())
    } else {
        CanonicalToken::new(ch.to_string())
    }
}

/// Map a physical key code (`ControlLeft`, `KeyA`, `ArrowUp`) to its canonical token.
///
/// Letter and punctuation positions are translated through the context's
/// layout. Codes that are not recognized degrade to the code itself with any
/// `Key`/`Digit`/`Numpad` prefix stripped.
pub fn canonical_token(code: &str, ctx: &KeyContext) -> CanonicalToken {
    let code = code.trim();
    if code.is_empty() {
        return CanonicalToken::new("Unidentified");
    }

    if code.starts_with("Control") {
        return CanonicalToken::new(CTRL);
    }
    if code.starts_with("Shift") {
        return CanonicalToken::new(SHIFT);
    }
    if code.starts_with("Alt") {
        return CanonicalToken::new(ALT);
    }
    if code.starts_with("Meta") || code.starts_with("OS") {
        return CanonicalToken::new(META);
    }

    match code {
        "ArrowUp" => return CanonicalToken::new("↑"),
        "ArrowDown" => return CanonicalToken::new("↓"),
        "ArrowLeft" => return CanonicalToken::new("←"),
        "ArrowRight" => return CanonicalToken::new("→"),
        "Space" => return CanonicalToken::new("Space"),
        _ => {}
    }

    if let Some(rest) = code.strip_prefix("Key") {
        let mut chars = rest.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return glyph_token(ctx.layout.translate(ch));
        }
        return CanonicalToken::new(rest);
    }

    if let Some(glyph) = punctuation_glyph(code) {
        return glyph_token(ctx.layout.translate(glyph));
    }

    if let Some(rest) = code.strip_prefix("Numpad") {
        if let Some(token) = numpad_token(rest) {
            return CanonicalToken::new(token);
        }
        return CanonicalToken::new(rest);
    }

    if let Some(rest) = code.strip_prefix("Digit") {
        return CanonicalToken::new(rest);
    }

    CanonicalToken::new(code)
}

/// OS-flavored label for a token (`Meta` shows as `Cmd` on macOS).
pub fn display_token(token: &str, os: Os) -> &str {
    match token {
        META => os.meta_label(),
        ALT => os.alt_label(),
        _ => token,
    }
}
