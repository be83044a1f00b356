//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod item_effect;
mod quest_selector;
mod rarity;
mod xp_reason;

pub use item_effect::*;
pub use quest_selector::*;
pub use rarity::*;
pub use xp_reason::*;
