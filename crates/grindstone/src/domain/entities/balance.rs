//! UserBalance - Experience, level, gold and earned titles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::services::level_for_experience;
use crate::domain::value_objects::XpReason;

/// Per-user progression balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserBalance {
    pub user_id: Uuid,
    pub experience: i64,
    /// Always `level_for_experience(experience)`; only `set_experience` writes it
    pub level: i32,
    pub gold: i64,
    /// Earned achievement ids
    pub titles: Vec<String>,
    pub active_title: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserBalance {
    /// Fresh balance for a newly registered user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            experience: 0,
            level: level_for_experience(0),
            gold: 0,
            titles: Vec::new(),
            active_title: None,
            updated_at: Utc::now(),
        }
    }

    /// Applies a signed delta, flooring at zero. Returns the delta actually applied.
    pub fn apply_experience_delta(&mut self, delta: i64) -> i64 {
        let previous = self.experience;
        self.set_experience(previous.saturating_add(delta).max(0));
        self.experience - previous
    }

    fn set_experience(&mut self, experience: i64) {
        self.experience = experience;
        self.level = level_for_experience(experience);
    }

    pub fn has_title(&self, achievement_id: &str) -> bool {
        self.titles.iter().any(|t| t == achievement_id)
    }
}

/// Immutable audit row, one per experience change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub delta: i64,
    pub reason: XpReason,
    pub created_at: DateTime<Utc>,
}

impl XpTransaction {
    pub fn new(user_id: Uuid, delta: i64, reason: XpReason, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            delta,
            reason,
            created_at,
        }
    }
}

/// Snapshot used by the achievement evaluator
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
    pub total_logs: i64,
    pub longest_streak: i64,
    pub perfect_days: i64,
    pub level: i32,
}
