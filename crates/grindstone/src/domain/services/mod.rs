//! Domain Services
//!
//! Pure rules shared by every call site: no I/O, no clock, no randomness.
//! Random draws are made by the caller and passed in.

mod achievements;
mod leveling;
mod quest_drafting;
mod smuggler_pricing;

pub use achievements::*;
pub use leveling::*;
pub use quest_drafting::*;
pub use smuggler_pricing::*;
