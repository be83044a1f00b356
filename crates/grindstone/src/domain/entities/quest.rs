//! Quest - Short-lived objective on a tracked metric

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::QuestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub metric_id: Uuid,
    pub target_value: i32,
    pub current_value: i32,
    pub xp_reward: i64,
    pub status: QuestStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quest {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// One unit of progress. Returns true when this tick completed the quest.
    pub fn advance(&mut self) -> bool {
        if self.status != QuestStatus::Active {
            return false;
        }
        self.current_value += 1;
        if self.current_value >= self.target_value {
            self.status = QuestStatus::Completed;
            return true;
        }
        false
    }
}

/// Summed awarded score for one tracked metric over a trailing window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricScore {
    pub metric_id: Uuid,
    pub metric_name: String,
    pub total_score: i64,
}
