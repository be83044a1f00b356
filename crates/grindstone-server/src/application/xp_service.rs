//! XP/Level Application Service
//!
//! Converts experience deltas into levels, unlocks titles, and appends the
//! audit trail. Level is recomputed on every write, never stored on its own.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use grindstone::{
    evaluate_achievements, level_progress_percent, threshold_for_level, ActiveBuff,
    ActivityRepository, BalanceRepository, DomainError, EngineEvent, LedgerStore, LedgerTx,
    ShopRepository, XpReason, XpTransaction, MAX_LEVEL,
};

use super::EngineContext;

/// Result of one experience change
#[derive(Debug, Clone, Serialize)]
pub struct XpAward {
    pub user_id: Uuid,
    /// Delta actually applied (a floored deduction removes less than asked)
    pub delta: i64,
    pub previous_experience: i64,
    pub experience: i64,
    pub previous_level: i32,
    pub level: i32,
    pub leveled_up: bool,
    pub new_titles: Vec<String>,
}

impl XpAward {
    pub fn events(&self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.leveled_up {
            events.push(EngineEvent::LevelUp {
                user_id: self.user_id,
                level: self.level,
            });
        }
        events.extend(
            self.new_titles
                .iter()
                .map(|achievement_id| EngineEvent::TitleUnlocked {
                    user_id: self.user_id,
                    achievement_id: achievement_id.clone(),
                }),
        );
        events
    }
}

/// Progress summary for the status screen
#[derive(Debug, Clone, Serialize)]
pub struct XpStatus {
    pub user_id: Uuid,
    pub experience: i64,
    pub level: i32,
    pub current_level_threshold: i64,
    /// `None` at the level cap
    pub next_level_threshold: Option<i64>,
    pub progress_percent: i32,
    pub gold: i64,
    pub titles: Vec<String>,
    pub active_title: Option<String>,
    pub active_buffs: Vec<ActiveBuff>,
}

/// Apply a signed experience delta inside an open transaction.
///
/// Locks the balance row, recomputes level, evaluates achievements against
/// fresh stats, persists the balance and appends exactly one audit row.
pub(crate) async fn apply_experience(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    delta: i64,
    reason: XpReason,
    now: DateTime<Utc>,
) -> Result<XpAward, DomainError> {
    let mut balance = tx
        .lock_balance(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", user_id))?;

    let previous_experience = balance.experience;
    let previous_level = balance.level;
    let applied = balance.apply_experience_delta(delta);

    let new_titles: Vec<String> = match tx.activity_stats(user_id).await {
        Ok(mut stats) => {
            stats.level = balance.level;
            evaluate_achievements(&stats, &balance.titles)
                .into_iter()
                .map(|a| a.id.to_string())
                .collect()
        }
        Err(e) => {
            tracing::warn!("Achievement evaluation skipped for {}: {}", user_id, e);
            Vec::new()
        }
    };
    balance.titles.extend(new_titles.iter().cloned());
    balance.updated_at = now;

    tx.save_balance(&balance).await?;
    tx.insert_xp_transaction(&XpTransaction::new(user_id, applied, reason.clone(), now))
        .await?;

    let award = XpAward {
        user_id,
        delta: applied,
        previous_experience,
        experience: balance.experience,
        previous_level,
        level: balance.level,
        leveled_up: balance.level > previous_level,
        new_titles,
    };

    if award.leveled_up {
        tracing::info!("⭐ {} reached level {} ({})", user_id, award.level, reason);
    }
    for title in &award.new_titles {
        tracing::info!("🏅 {} unlocked title {}", user_id, title);
    }

    Ok(award)
}

/// Application service for experience and levels
pub struct XpService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> XpService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    /// Award positive experience
    pub async fn award_xp(
        &self,
        user_id: Uuid,
        reason: XpReason,
        amount: i64,
    ) -> Result<XpAward, DomainError> {
        DomainError::require_positive("amount", amount)?;
        self.change(user_id, reason, amount).await
    }

    /// Remove experience, flooring at zero
    pub async fn deduct_xp(
        &self,
        user_id: Uuid,
        reason: XpReason,
        amount: i64,
    ) -> Result<XpAward, DomainError> {
        DomainError::require_positive("amount", amount)?;
        self.change(user_id, reason, -amount).await
    }

    async fn change(
        &self,
        user_id: Uuid,
        reason: XpReason,
        delta: i64,
    ) -> Result<XpAward, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let award = apply_experience(tx.as_mut(), user_id, delta, reason, self.ctx.now()).await?;
        tx.commit().await?;

        self.ctx.publish(&award.events()).await;
        Ok(award)
    }

    /// Current experience, level progress, gold, titles and buffs
    pub async fn get_xp_status(&self, user_id: Uuid) -> Result<XpStatus, DomainError> {
        self.ctx.sweep_expired_buffs(user_id).await;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;
        let balance = tx
            .find_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        let active_buffs = tx.active_buffs(user_id, now).await?;
        tx.commit().await?;

        let current_level_threshold = if balance.level <= 1 {
            0
        } else {
            threshold_for_level(balance.level)
        };
        let next_level_threshold =
            (balance.level < MAX_LEVEL).then(|| threshold_for_level(balance.level + 1));

        Ok(XpStatus {
            user_id,
            experience: balance.experience,
            level: balance.level,
            current_level_threshold,
            next_level_threshold,
            progress_percent: level_progress_percent(balance.experience),
            gold: balance.gold,
            titles: balance.titles,
            active_title: balance.active_title,
            active_buffs,
        })
    }
}
