//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - UserBalance: experience, level, gold, titles
//! - Achievement: static title catalog
//! - Boss: ambient templates/encounters and the campaign ladder
//! - Quest: short-lived metric objectives
//! - Item: catalog, inventory, passive stacks, buffs, smuggler offers
//! - Event: payloads handed to the notification collaborator

mod achievement;
mod balance;
mod boss;
mod event;
mod item;
mod quest;

pub use achievement::*;
pub use balance::*;
pub use boss::*;
pub use event::*;
pub use item::*;
pub use quest::*;
