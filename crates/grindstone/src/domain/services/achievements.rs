//! Achievement evaluator
//!
//! Given a stats snapshot and the titles already owned, returns the catalog
//! entries that are newly satisfied, in catalog order.

use crate::domain::entities::{AchievementDefinition, UserStats, ACHIEVEMENTS};

pub fn evaluate_achievements(
    stats: &UserStats,
    owned: &[String],
) -> Vec<&'static AchievementDefinition> {
    evaluate_against(ACHIEVEMENTS, stats, owned)
}

pub fn evaluate_against<'a>(
    catalog: &'a [AchievementDefinition],
    stats: &UserStats,
    owned: &[String],
) -> Vec<&'a AchievementDefinition> {
    catalog
        .iter()
        .filter(|a| !owned.iter().any(|t| t == a.id))
        .filter(|a| a.unlock_condition.is_met(stats))
        .collect()
}
