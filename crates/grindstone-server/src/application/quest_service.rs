//! Quest Application Service
//!
//! Drafts short objectives on the user's weakest metric and pays them out
//! when progress reaches the target.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use grindstone::domain::{draft_quest, weakest_metric, QUEST_TARGET_MAX, QUEST_TARGET_MIN};
use grindstone::{
    ActivityRepository, BalanceRepository, DomainError, EngineEvent, LedgerStore, LedgerTx, Quest,
    QuestRepository, QuestSelector, XpReason,
};

use super::xp_service::{apply_experience, XpAward};
use super::EngineContext;

/// One quest's state after an advance
#[derive(Debug, Clone, Serialize)]
pub struct QuestProgress {
    pub quest: Quest,
    pub completed: bool,
    pub xp: Option<XpAward>,
}

/// Advance every active, unexpired quest on a metric by one
pub(crate) async fn advance_in(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    metric_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(Vec<QuestProgress>, Vec<EngineEvent>), DomainError> {
    let quests = tx
        .lock_active_quests_for_metric(user_id, metric_id, now)
        .await?;

    let mut progress = Vec::with_capacity(quests.len());
    let mut events = Vec::new();

    for mut quest in quests {
        let completed = quest.advance();
        tx.save_quest(&quest).await?;

        let xp = if completed {
            let award = apply_experience(
                tx,
                user_id,
                quest.xp_reward,
                XpReason::QuestCompleted { quest_id: quest.id },
                now,
            )
            .await?;
            tracing::info!("📜 {} completed quest {}", user_id, quest.title);
            events.push(EngineEvent::QuestCompleted {
                user_id,
                quest_id: quest.id,
                title: quest.title.clone(),
                xp_reward: quest.xp_reward,
            });
            events.extend(award.events());
            Some(award)
        } else {
            None
        };

        progress.push(QuestProgress {
            quest,
            completed,
            xp,
        });
    }

    Ok((progress, events))
}

pub struct QuestService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> QuestService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    /// Draft a quest for the weakest metric over the trailing window
    pub async fn generate_quest(&self, user_id: Uuid) -> Result<Quest, DomainError> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;

        // Serializes the capacity check per user
        tx.lock_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        tx.delete_expired_quests(user_id, now).await?;
        let limit = self.ctx.config.quest_capacity;
        if tx.count_active_quests(user_id).await? >= limit {
            return Err(DomainError::CapacityReached { limit });
        }

        let since = self.ctx.clock.today() - Duration::days(self.ctx.config.quest_window_days);
        let scores = tx.metric_scores_since(user_id, since).await?;
        let metric = weakest_metric(&scores)
            .ok_or_else(|| DomainError::not_found_str("TrackedMetric", "active"))?;

        let target = self
            .ctx
            .random
            .range_inclusive(QUEST_TARGET_MIN, QUEST_TARGET_MAX) as i32;
        let quest = draft_quest(user_id, metric, target, now);
        tx.insert_quest(&quest).await?;
        tx.commit().await?;

        tracing::info!(
            "New quest for {}: {} (target {}, {} XP)",
            user_id,
            quest.title,
            quest.target_value,
            quest.xp_reward
        );
        Ok(quest)
    }

    pub async fn advance_quest(
        &self,
        user_id: Uuid,
        metric_id: Uuid,
    ) -> Result<Vec<QuestProgress>, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let (progress, events) = advance_in(tx.as_mut(), user_id, metric_id, self.ctx.now()).await?;
        tx.commit().await?;

        self.ctx.publish(&events).await;
        Ok(progress)
    }

    /// Returns how many quests were removed
    pub async fn abandon_quest(
        &self,
        user_id: Uuid,
        selector: QuestSelector,
    ) -> Result<u64, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let removed = tx.delete_active_quests(user_id, selector).await?;

        if let QuestSelector::One(quest_id) = selector {
            if removed == 0 {
                return Err(DomainError::not_found("Quest", quest_id));
            }
        }
        tx.commit().await?;

        tracing::info!("{} abandoned {} quest(s)", user_id, removed);
        Ok(removed)
    }

    pub async fn list_quests(&self, user_id: Uuid) -> Result<Vec<Quest>, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let quests = tx.list_quests(user_id).await?;
        tx.commit().await?;
        Ok(quests)
    }
}
