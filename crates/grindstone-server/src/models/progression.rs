//! Progression - XP, gold and titles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use grindstone::{ActiveBuff, UnlockCondition};

use crate::application::{TitleView, XpAward, XpStatus};

// ============================================
// Request DTOs
// ============================================

/// Experience change pushed by the daily-log pipeline
#[derive(Debug, Deserialize, ToSchema)]
pub struct XpChangeRequest {
    pub amount: i64,
    /// Audit key, e.g. `daily_log:2026-03-10`. Unknown tags are kept verbatim.
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GoldChangeRequest {
    pub amount: i64,
}

/// Equip a title, or clear it with `null`
#[derive(Debug, Deserialize, ToSchema)]
pub struct EquipTitleRequest {
    pub achievement_id: Option<String>,
}

// ============================================
// Response DTOs
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct XpAwardResponse {
    pub user_id: Uuid,
    pub delta: i64,
    pub previous_experience: i64,
    pub experience: i64,
    pub previous_level: i32,
    pub level: i32,
    pub leveled_up: bool,
    pub new_titles: Vec<String>,
}

impl From<XpAward> for XpAwardResponse {
    fn from(award: XpAward) -> Self {
        Self {
            user_id: award.user_id,
            delta: award.delta,
            previous_experience: award.previous_experience,
            experience: award.experience,
            previous_level: award.previous_level,
            level: award.level,
            leveled_up: award.leveled_up,
            new_titles: award.new_titles,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuffResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub effect: String,
    pub effect_value: i32,
    pub expires_at: DateTime<Utc>,
}

impl From<ActiveBuff> for BuffResponse {
    fn from(buff: ActiveBuff) -> Self {
        Self {
            id: buff.id,
            item_id: buff.item_id,
            effect: buff.effect.to_string(),
            effect_value: buff.effect_value,
            expires_at: buff.expires_at,
        }
    }
}

/// Status screen summary
#[derive(Debug, Serialize, ToSchema)]
pub struct XpStatusResponse {
    pub user_id: Uuid,
    pub experience: i64,
    pub level: i32,
    pub current_level_threshold: i64,
    pub next_level_threshold: Option<i64>,
    pub progress_percent: i32,
    pub gold: i64,
    pub titles: Vec<String>,
    pub active_title: Option<String>,
    pub active_buffs: Vec<BuffResponse>,
}

impl From<XpStatus> for XpStatusResponse {
    fn from(status: XpStatus) -> Self {
        Self {
            user_id: status.user_id,
            experience: status.experience,
            level: status.level,
            current_level_threshold: status.current_level_threshold,
            next_level_threshold: status.next_level_threshold,
            progress_percent: status.progress_percent,
            gold: status.gold,
            titles: status.titles,
            active_title: status.active_title,
            active_buffs: status.active_buffs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoldBalanceResponse {
    pub user_id: Uuid,
    pub gold: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TitleResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    /// `total_logs`, `longest_streak`, `perfect_days` or `level`
    pub unlock_kind: String,
    pub unlock_threshold: i64,
    pub unlocked: bool,
    pub equipped: bool,
}

impl From<TitleView> for TitleResponse {
    fn from(view: TitleView) -> Self {
        let (unlock_kind, unlock_threshold) = match view.unlock_condition {
            UnlockCondition::TotalLogs(n) => ("total_logs", n),
            UnlockCondition::LongestStreak(n) => ("longest_streak", n),
            UnlockCondition::PerfectDays(n) => ("perfect_days", n),
            UnlockCondition::Level(n) => ("level", i64::from(n)),
        };
        Self {
            id: view.id.to_string(),
            title: view.title.to_string(),
            description: view.description.to_string(),
            icon: view.icon.to_string(),
            unlock_kind: unlock_kind.to_string(),
            unlock_threshold,
            unlocked: view.unlocked,
            equipped: view.equipped,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EquippedTitleResponse {
    pub active_title: Option<String>,
}
