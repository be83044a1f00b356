//! Quest - Generated objectives on tracked metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use grindstone::Quest;

use super::XpAwardResponse;
use crate::application::QuestProgress;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceQuestRequest {
    pub metric_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub metric_id: Uuid,
    pub target_value: i32,
    pub current_value: i32,
    pub xp_reward: i64,
    /// `active` or `completed`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Quest> for QuestResponse {
    fn from(quest: Quest) -> Self {
        Self {
            id: quest.id,
            title: quest.title,
            description: quest.description,
            metric_id: quest.metric_id,
            target_value: quest.target_value,
            current_value: quest.current_value,
            xp_reward: quest.xp_reward,
            status: quest.status.to_string(),
            created_at: quest.created_at,
            expires_at: quest.expires_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestProgressResponse {
    pub quest: QuestResponse,
    pub completed: bool,
    pub xp: Option<XpAwardResponse>,
}

impl From<QuestProgress> for QuestProgressResponse {
    fn from(progress: QuestProgress) -> Self {
        Self {
            quest: progress.quest.into(),
            completed: progress.completed,
            xp: progress.xp.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AbandonQuestResponse {
    pub removed: u64,
}
