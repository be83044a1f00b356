//! Grindstone API Routes
//!
//! - /me/status, /me/titles, /me/title - XP, level, gold and titles
//! - /me/boss, /me/campaign - Ambient boss and campaign combat
//! - /me/focus-sessions - Focus sessions (XP, damage, quest progress)
//! - /me/quests - Generated quests
//! - /shop/items, /me/shop, /me/inventory, /me/smuggler - Item economy
//! - /internal/users/:id/... - Pipeline-facing XP and gold adjustments

pub mod combat;
pub mod error;
pub mod internal;
pub mod me;
pub mod quests;
pub mod shop;
pub mod swagger;
