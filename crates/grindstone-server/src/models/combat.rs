//! Combat - Ambient boss, campaign and focus sessions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use grindstone::{BossEncounter, CampaignBoss, EncounterState};

use super::{ItemResponse, QuestProgressResponse, XpAwardResponse};
use crate::application::{
    AmbientBossView, AmbientDamageOutcome, BossReward, CampaignDamageOutcome, CampaignReward,
    CampaignStatus, FocusSessionResult, PenaltyTick,
};

// ============================================
// Request DTOs
// ============================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct DamageRequest {
    pub amount: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FocusSessionRequest {
    pub minutes: i64,
    /// Tracked metric the session counted towards, for quest progress
    pub metric_id: Option<Uuid>,
}

// ============================================
// Ambient boss
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct EncounterResponse {
    pub id: Uuid,
    pub template_id: Uuid,
    pub boss_name: String,
    pub max_health: i32,
    pub current_health: i32,
    /// `active` or `defeated`
    pub state: String,
    pub spawned_at: DateTime<Utc>,
    pub defeated_at: Option<DateTime<Utc>>,
}

impl From<BossEncounter> for EncounterResponse {
    fn from(encounter: BossEncounter) -> Self {
        let state = match encounter.state() {
            EncounterState::Active => "active",
            EncounterState::Defeated => "defeated",
        };
        Self {
            id: encounter.id,
            template_id: encounter.template_id,
            boss_name: encounter.boss_name,
            max_health: encounter.max_health,
            current_health: encounter.current_health,
            state: state.to_string(),
            spawned_at: encounter.spawned_at,
            defeated_at: encounter.defeated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PenaltyTickResponse {
    pub encounter_id: Uuid,
    pub date: NaiveDate,
    pub base_penalty: i64,
    pub ward_stacks: i64,
    pub penalty_xp: i64,
    pub xp: Option<XpAwardResponse>,
}

impl From<PenaltyTick> for PenaltyTickResponse {
    fn from(tick: PenaltyTick) -> Self {
        Self {
            encounter_id: tick.encounter_id,
            date: tick.date,
            base_penalty: tick.base_penalty,
            ward_stacks: tick.ward_stacks,
            penalty_xp: tick.penalty_xp,
            xp: tick.xp.map(Into::into),
        }
    }
}

/// The active encounter; `encounter` is null when no boss is up
#[derive(Debug, Serialize, ToSchema)]
pub struct AmbientBossResponse {
    pub encounter: Option<EncounterResponse>,
    pub daily_penalty_xp: i64,
    pub penalty: Option<PenaltyTickResponse>,
}

impl From<Option<AmbientBossView>> for AmbientBossResponse {
    fn from(view: Option<AmbientBossView>) -> Self {
        match view {
            Some(view) => Self {
                encounter: Some(view.encounter.into()),
                daily_penalty_xp: view.daily_penalty_xp,
                penalty: view.penalty.map(Into::into),
            },
            None => Self {
                encounter: None,
                daily_penalty_xp: 0,
                penalty: None,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RewardResponse {
    pub xp: Option<XpAwardResponse>,
    pub gold: i64,
    pub gold_balance: i64,
    pub item: Option<ItemResponse>,
}

impl From<BossReward> for RewardResponse {
    fn from(reward: BossReward) -> Self {
        Self {
            xp: reward.xp.map(Into::into),
            gold: reward.gold,
            gold_balance: reward.gold_balance,
            item: reward.item.map(Into::into),
        }
    }
}

impl From<CampaignReward> for RewardResponse {
    fn from(reward: CampaignReward) -> Self {
        Self {
            xp: reward.xp.map(Into::into),
            gold: reward.gold,
            gold_balance: reward.gold_balance,
            item: reward.item.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AmbientDamageResponse {
    /// `damaged`, `defeated` or `not_active`
    pub outcome: String,
    pub encounter_id: Uuid,
    pub encounter: Option<EncounterResponse>,
    pub damage: i32,
    pub reward: Option<RewardResponse>,
}

impl From<AmbientDamageOutcome> for AmbientDamageResponse {
    fn from(outcome: AmbientDamageOutcome) -> Self {
        match outcome {
            AmbientDamageOutcome::Damaged { encounter, damage } => Self {
                outcome: "damaged".to_string(),
                encounter_id: encounter.id,
                encounter: Some(encounter.into()),
                damage,
                reward: None,
            },
            AmbientDamageOutcome::Defeated {
                encounter,
                damage,
                reward,
            } => Self {
                outcome: "defeated".to_string(),
                encounter_id: encounter.id,
                encounter: Some(encounter.into()),
                damage,
                reward: Some(reward.into()),
            },
            AmbientDamageOutcome::NotActive { encounter_id } => Self {
                outcome: "not_active".to_string(),
                encounter_id,
                encounter: None,
                damage: 0,
                reward: None,
            },
        }
    }
}

// ============================================
// Campaign
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignBossResponse {
    pub stage: i32,
    pub name: String,
    pub max_health: i32,
    pub reward_xp: i64,
    pub reward_gold: i64,
    pub reward_item_rarity: Option<String>,
}

impl From<CampaignBoss> for CampaignBossResponse {
    fn from(boss: CampaignBoss) -> Self {
        Self {
            stage: boss.stage,
            name: boss.name,
            max_health: boss.max_health,
            reward_xp: boss.reward_xp,
            reward_gold: boss.reward_gold,
            reward_item_rarity: boss.reward_item_rarity.map(|r| r.to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignStatusResponse {
    /// `active`, or `complete` once every stage boss is down
    pub status: String,
    pub stage: i32,
    pub boss: Option<CampaignBossResponse>,
    pub current_health: Option<i32>,
}

impl From<CampaignStatus> for CampaignStatusResponse {
    fn from(status: CampaignStatus) -> Self {
        match status {
            CampaignStatus::Active {
                stage,
                boss,
                current_health,
            } => Self {
                status: "active".to_string(),
                stage,
                boss: Some(boss.into()),
                current_health: Some(current_health),
            },
            CampaignStatus::Complete { stage } => Self {
                status: "complete".to_string(),
                stage,
                boss: None,
                current_health: None,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignDamageResponse {
    /// `damaged`, `defeated` or `complete`
    pub outcome: String,
    pub stage: i32,
    pub boss_name: Option<String>,
    pub damage: i32,
    pub remaining_health: Option<i32>,
    pub max_health: Option<i32>,
    pub reward: Option<RewardResponse>,
    pub next_stage: Option<i32>,
}

impl From<CampaignDamageOutcome> for CampaignDamageResponse {
    fn from(outcome: CampaignDamageOutcome) -> Self {
        match outcome {
            CampaignDamageOutcome::Damaged {
                stage,
                boss_name,
                damage,
                remaining_health,
                max_health,
            } => Self {
                outcome: "damaged".to_string(),
                stage,
                boss_name: Some(boss_name),
                damage,
                remaining_health: Some(remaining_health),
                max_health: Some(max_health),
                reward: None,
                next_stage: None,
            },
            CampaignDamageOutcome::Defeated {
                stage,
                boss_name,
                damage,
                reward,
                next_stage,
            } => Self {
                outcome: "defeated".to_string(),
                stage,
                boss_name: Some(boss_name),
                damage,
                remaining_health: Some(0),
                max_health: None,
                reward: Some(reward.into()),
                next_stage: Some(next_stage),
            },
            CampaignDamageOutcome::Complete { stage } => Self {
                outcome: "complete".to_string(),
                stage,
                boss_name: None,
                damage: 0,
                remaining_health: None,
                max_health: None,
                reward: None,
                next_stage: None,
            },
        }
    }
}

// ============================================
// Focus sessions
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct FocusSessionResponse {
    pub minutes: i64,
    pub xp: XpAwardResponse,
    pub damage: i32,
    pub gold_gained: i64,
    pub ambient: Option<AmbientDamageResponse>,
    pub campaign: CampaignDamageResponse,
    pub quests: Vec<QuestProgressResponse>,
    /// Human-readable summary lines for the client
    pub messages: Vec<String>,
}

impl From<FocusSessionResult> for FocusSessionResponse {
    fn from(result: FocusSessionResult) -> Self {
        Self {
            minutes: result.minutes,
            xp: result.xp.into(),
            damage: result.damage,
            gold_gained: result.gold_gained,
            ambient: result.ambient.map(Into::into),
            campaign: result.campaign.into(),
            quests: result.quests.into_iter().map(Into::into).collect(),
            messages: result.messages,
        }
    }
}
