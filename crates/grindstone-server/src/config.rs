//! Engine configuration
//!
//! Tunables for rewards, quests, the smuggler and focus sessions. Values come
//! from shuttle secrets (or a local `.env`) under `GRINDSTONE_*` keys and fall
//! back to the defaults below.

use anyhow::{Context, Result};
use chrono::Duration;

/// Tunables shared by every engine service
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Gold paid for defeating any ambient boss
    pub ambient_gold_bounty: i64,
    /// Daily penalty XP removed per stack of a penalty ward
    pub ward_reduction_per_stack: i64,
    /// Simultaneous active quests per user
    pub quest_capacity: usize,
    /// Trailing window used to find the weakest metric
    pub quest_window_days: i64,
    /// Probability that a smuggler shows up on a given call
    pub smuggler_spawn_chance: f64,
    pub smuggler_offer_hours: i64,
    pub focus_xp_per_minute: i64,
    /// Longest focus session accepted in one call
    pub max_focus_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ambient_gold_bounty: 100,
            ward_reduction_per_stack: 10,
            quest_capacity: 3,
            quest_window_days: 14,
            smuggler_spawn_chance: 0.2,
            smuggler_offer_hours: 24,
            focus_xp_per_minute: 2,
            max_focus_minutes: 600,
        }
    }
}

impl EngineConfig {
    /// Build from a key lookup, keeping defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("GRINDSTONE_AMBIENT_GOLD_BOUNTY") {
            config.ambient_gold_bounty = parse_key("GRINDSTONE_AMBIENT_GOLD_BOUNTY", &v)?;
        }
        if let Some(v) = lookup("GRINDSTONE_WARD_REDUCTION_PER_STACK") {
            config.ward_reduction_per_stack =
                parse_key("GRINDSTONE_WARD_REDUCTION_PER_STACK", &v)?;
        }
        if let Some(v) = lookup("GRINDSTONE_QUEST_CAPACITY") {
            config.quest_capacity = parse_key("GRINDSTONE_QUEST_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("GRINDSTONE_QUEST_WINDOW_DAYS") {
            config.quest_window_days = parse_key("GRINDSTONE_QUEST_WINDOW_DAYS", &v)?;
        }
        if let Some(v) = lookup("GRINDSTONE_SMUGGLER_SPAWN_CHANCE") {
            let chance: f64 = parse_key("GRINDSTONE_SMUGGLER_SPAWN_CHANCE", &v)?;
            config.smuggler_spawn_chance = chance.clamp(0.0, 1.0);
        }
        if let Some(v) = lookup("GRINDSTONE_SMUGGLER_OFFER_HOURS") {
            config.smuggler_offer_hours = parse_key("GRINDSTONE_SMUGGLER_OFFER_HOURS", &v)?;
        }
        if let Some(v) = lookup("GRINDSTONE_FOCUS_XP_PER_MINUTE") {
            config.focus_xp_per_minute = parse_key("GRINDSTONE_FOCUS_XP_PER_MINUTE", &v)?;
        }
        if let Some(v) = lookup("GRINDSTONE_MAX_FOCUS_MINUTES") {
            config.max_focus_minutes = parse_key("GRINDSTONE_MAX_FOCUS_MINUTES", &v)?;
        }

        Ok(config)
    }

    pub fn smuggler_offer_window(&self) -> Duration {
        Duration::hours(self.smuggler_offer_hours)
    }
}

fn parse_key<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {value:?}"))
}
