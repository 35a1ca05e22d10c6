//! Value objects: validated text, dice and rule constants.

mod dice;
mod names;
mod rules;

pub use dice::{DicePair, DIE_SIDES};
pub use names::{EntryText, SessionName, SkillName};
pub use rules::GameRules;
