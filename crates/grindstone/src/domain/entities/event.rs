//! EngineEvent - Payloads for the notification collaborator
//!
//! The engine never delivers notifications itself; it hands these to an
//! `EventPublisher` after the unit of work commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    BossDamaged {
        user_id: Uuid,
        encounter_id: Uuid,
        boss_name: String,
        damage: i32,
        remaining_health: i32,
    },
    BossDefeated {
        user_id: Uuid,
        encounter_id: Uuid,
        boss_name: String,
        xp_reward: i64,
        gold_reward: i64,
        item_name: Option<String>,
    },
    CampaignBossDefeated {
        user_id: Uuid,
        stage: i32,
        boss_name: String,
        xp_reward: i64,
        gold_reward: i64,
    },
    QuestCompleted {
        user_id: Uuid,
        quest_id: Uuid,
        title: String,
        xp_reward: i64,
    },
    LevelUp {
        user_id: Uuid,
        level: i32,
    },
    TitleUnlocked {
        user_id: Uuid,
        achievement_id: String,
    },
}

impl EngineEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            EngineEvent::BossDamaged { user_id, .. }
            | EngineEvent::BossDefeated { user_id, .. }
            | EngineEvent::CampaignBossDefeated { user_id, .. }
            | EngineEvent::QuestCompleted { user_id, .. }
            | EngineEvent::LevelUp { user_id, .. }
            | EngineEvent::TitleUnlocked { user_id, .. } => *user_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::BossDamaged { .. } => "boss_damaged",
            EngineEvent::BossDefeated { .. } => "boss_defeated",
            EngineEvent::CampaignBossDefeated { .. } => "campaign_boss_defeated",
            EngineEvent::QuestCompleted { .. } => "quest_completed",
            EngineEvent::LevelUp { .. } => "level_up",
            EngineEvent::TitleUnlocked { .. } => "title_unlocked",
        }
    }
}

/// Envelope delivered to webhook endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub delivery_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: EngineEvent,
}

impl EventEnvelope {
    pub fn new(event: EngineEvent) -> Self {
        Self {
            delivery_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}
