pub mod catalog;
pub mod index;
pub mod matcher;
pub mod protection;
pub mod shortcut;

pub use index::ShortcutIndex;
pub use matcher::{MatchEngine, MatchOutcome};
pub use protection::{ProtectionLevel, classify};
pub use shortcut::{Difficulty, PressType, ShortcutRecord};
