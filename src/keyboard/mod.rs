pub mod combo;
pub mod layout;
pub mod platform;
pub mod token;

pub use combo::{NormalizedCombo, normalize};
pub use platform::Os;
pub use token::{CanonicalToken, KeyContext, canonical_token};
