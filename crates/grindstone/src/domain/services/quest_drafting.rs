//! Quest drafting
//!
//! Chooses the metric to work on and derives reward and expiry from the
//! rolled target.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{MetricScore, Quest};
use crate::domain::value_objects::QuestStatus;

pub const QUEST_TARGET_MIN: i64 = 2;
pub const QUEST_TARGET_MAX: i64 = 4;

/// Lowest summed score wins; the first one seen wins a tie
pub fn weakest_metric(scores: &[MetricScore]) -> Option<&MetricScore> {
    scores.iter().fold(None, |best: Option<&MetricScore>, s| match best {
        Some(b) if b.total_score <= s.total_score => Some(b),
        _ => Some(s),
    })
}

pub fn quest_xp_reward(target: i32) -> i64 {
    i64::from(target) * 150 + 100
}

/// Builds an active quest from a metric and a rolled target
pub fn draft_quest(user_id: Uuid, metric: &MetricScore, target: i32, now: DateTime<Utc>) -> Quest {
    Quest {
        id: Uuid::new_v4(),
        user_id,
        title: format!("Shore up {}", metric.metric_name),
        description: format!(
            "Log {} {} actions before this quest expires.",
            target, metric.metric_name
        ),
        metric_id: metric.metric_id,
        target_value: target,
        current_value: 0,
        xp_reward: quest_xp_reward(target),
        status: QuestStatus::Active,
        created_at: now,
        expires_at: now + Duration::days(i64::from(target) + 1),
    }
}
