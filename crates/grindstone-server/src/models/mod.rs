//! Grindstone HTTP Models
//!
//! - Progression: XP, levels, gold and titles
//! - Combat: ambient boss, campaign and focus sessions
//! - Quest: generated objectives
//! - Shop: catalog, inventory, buffs and the smuggler
//! - Error: the `{kind, message}` body every failed request returns

mod combat;
mod error;
mod progression;
mod quest;
mod shop;

pub use combat::*;
pub use error::*;
pub use progression::*;
pub use quest::*;
pub use shop::*;
