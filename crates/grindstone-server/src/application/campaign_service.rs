//! Campaign Application Service
//!
//! A linear ladder of stage bosses. Progress is created on first access,
//! boss health is filled in lazily, and a stage with no boss means the
//! campaign is complete.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use grindstone::{
    BalanceRepository, CampaignBoss, CampaignProgress, CampaignRepository, DomainError,
    EngineEvent, Item, LedgerStore, LedgerTx, XpReason,
};

use super::currency_service::credit_gold_in;
use super::shop_service::{grant_item, roll_loot};
use super::xp_service::{apply_experience, XpAward};
use super::EngineContext;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CampaignStatus {
    Active {
        stage: i32,
        boss: CampaignBoss,
        current_health: i32,
    },
    Complete {
        stage: i32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignReward {
    pub xp: Option<XpAward>,
    pub gold: i64,
    pub gold_balance: i64,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CampaignDamageOutcome {
    Damaged {
        stage: i32,
        boss_name: String,
        damage: i32,
        remaining_health: i32,
        max_health: i32,
    },
    Defeated {
        stage: i32,
        boss_name: String,
        damage: i32,
        reward: CampaignReward,
        next_stage: i32,
    },
    Complete {
        stage: i32,
    },
}

/// Lock the user's progress row, creating stage 1 on first access.
///
/// The balance row is locked first so that two first accesses cannot both
/// create progress; a concurrent creator is left untouched either way.
async fn lock_or_create_progress(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CampaignProgress, DomainError> {
    tx.lock_balance(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", user_id))?;

    if let Some(progress) = tx.lock_campaign_progress(user_id).await? {
        return Ok(progress);
    }
    tx.create_campaign_progress(&CampaignProgress::new(user_id, now))
        .await?;
    // Re-read so the row lock is held from here on
    tx.lock_campaign_progress(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("CampaignProgress", user_id))
}

/// Damage the current stage boss inside the caller's transaction
pub(crate) async fn damage_in<S: LedgerStore>(
    tx: &mut dyn LedgerTx,
    ctx: &EngineContext<S>,
    user_id: Uuid,
    amount: i32,
    now: DateTime<Utc>,
) -> Result<(CampaignDamageOutcome, Vec<EngineEvent>), DomainError> {
    let mut progress = lock_or_create_progress(tx, user_id, now).await?;
    let stage = progress.current_stage;

    let Some(boss) = tx.campaign_boss(stage).await? else {
        return Ok((CampaignDamageOutcome::Complete { stage }, Vec::new()));
    };

    let health = progress.health_against(&boss);
    let remaining = health.saturating_sub(amount).max(0);

    if remaining > 0 {
        progress.current_boss_health = Some(remaining);
        progress.updated_at = now;
        tx.save_campaign_progress(&progress).await?;
        return Ok((
            CampaignDamageOutcome::Damaged {
                stage,
                boss_name: boss.name,
                damage: amount,
                remaining_health: remaining,
                max_health: boss.max_health,
            },
            Vec::new(),
        ));
    }

    let xp = if boss.reward_xp > 0 {
        Some(
            apply_experience(
                tx,
                user_id,
                boss.reward_xp,
                XpReason::CampaignBossDefeated { stage },
                now,
            )
            .await?,
        )
    } else {
        None
    };

    let gold_balance = credit_gold_in(tx, user_id, boss.reward_gold).await?;

    let item = match roll_loot(tx, ctx.random.as_ref(), boss.reward_item_rarity).await? {
        Some(item) => grant_item(tx, user_id, item).await?,
        None => None,
    };

    progress.advance(now);
    tx.save_campaign_progress(&progress).await?;

    tracing::info!(
        "🏰 {} cleared campaign stage {} ({}), advancing to {}",
        user_id,
        stage,
        boss.name,
        progress.current_stage
    );

    let mut events = vec![EngineEvent::CampaignBossDefeated {
        user_id,
        stage,
        boss_name: boss.name.clone(),
        xp_reward: boss.reward_xp,
        gold_reward: boss.reward_gold,
    }];
    if let Some(award) = &xp {
        events.extend(award.events());
    }

    Ok((
        CampaignDamageOutcome::Defeated {
            stage,
            boss_name: boss.name,
            damage: amount,
            reward: CampaignReward {
                xp,
                gold: boss.reward_gold,
                gold_balance,
                item,
            },
            next_stage: progress.current_stage,
        },
        events,
    ))
}

pub struct CampaignService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> CampaignService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    pub async fn get_campaign_status(&self, user_id: Uuid) -> Result<CampaignStatus, DomainError> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;
        let mut progress = lock_or_create_progress(tx.as_mut(), user_id, now).await?;
        let stage = progress.current_stage;

        let Some(boss) = tx.campaign_boss(stage).await? else {
            tx.commit().await?;
            return Ok(CampaignStatus::Complete { stage });
        };

        if progress.current_boss_health.is_none() {
            progress.health_against(&boss);
            progress.updated_at = now;
            tx.save_campaign_progress(&progress).await?;
        }
        tx.commit().await?;

        let current_health = progress.current_boss_health.unwrap_or(boss.max_health);
        Ok(CampaignStatus::Active {
            stage,
            boss,
            current_health,
        })
    }

    pub async fn deal_campaign_damage(
        &self,
        user_id: Uuid,
        amount: i32,
    ) -> Result<CampaignDamageOutcome, DomainError> {
        DomainError::require_positive("damage", i64::from(amount))?;

        let mut tx = self.ctx.begin().await?;
        let (outcome, events) =
            damage_in(tx.as_mut(), &self.ctx, user_id, amount, self.ctx.now()).await?;
        tx.commit().await?;

        self.ctx.publish(&events).await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::TestEngine;
    use grindstone::{ItemCategory, ItemEffect, Rarity};

    #[tokio::test]
    async fn test_first_access_creates_stage_one() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        engine.add_campaign_boss(1, "Gatekeeper", 500, 200, 50).await;

        let status = CampaignService::new(engine.ctx())
            .get_campaign_status(user)
            .await
            .unwrap();
        match status {
            CampaignStatus::Active {
                stage,
                current_health,
                ..
            } => assert_eq!((stage, current_health), (1, 500)),
            other => panic!("expected active, got {other:?}"),
        }

        let progress = engine.state().await.campaign.get(&user).cloned().unwrap();
        assert_eq!(progress.current_stage, 1);
        assert_eq!(progress.current_boss_health, Some(500));
    }

    #[tokio::test]
    async fn test_defeat_advances_and_pays() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        engine.add_campaign_boss(1, "Gatekeeper", 500, 200, 50).await;
        engine.add_campaign_boss(2, "Warden", 800, 300, 80).await;
        let relic = engine
            .add_item(Item::new(
                "Stage Relic",
                Rarity::Rare,
                ItemCategory::Consumable,
                ItemEffect::InstantInsight,
                400,
            ))
            .await;
        let campaign = CampaignService::new(engine.ctx());

        let hit = campaign.deal_campaign_damage(user, 120).await.unwrap();
        assert!(matches!(
            hit,
            CampaignDamageOutcome::Damaged {
                remaining_health: 380,
                ..
            }
        ));

        let kill = campaign.deal_campaign_damage(user, 400).await.unwrap();
        match kill {
            CampaignDamageOutcome::Defeated {
                stage,
                next_stage,
                reward,
                ..
            } => {
                assert_eq!((stage, next_stage), (1, 2));
                assert_eq!(reward.gold_balance, 50);
                assert_eq!(reward.item.map(|i| i.id), Some(relic.id));
            }
            other => panic!("expected defeat, got {other:?}"),
        }

        let balance = engine.balance(user).await;
        assert_eq!((balance.experience, balance.gold), (200, 50));
        let progress = engine.state().await.campaign.get(&user).cloned().unwrap();
        assert_eq!(progress.current_stage, 2);
        assert_eq!(progress.current_boss_health, None);
        assert!(engine.published().await.iter().any(|e| matches!(
            e,
            EngineEvent::CampaignBossDefeated { stage: 1, .. }
        )));

        match campaign.get_campaign_status(user).await.unwrap() {
            CampaignStatus::Active { current_health, .. } => assert_eq!(current_health, 800),
            other => panic!("expected stage 2, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_past_last_stage_is_complete() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        engine.add_campaign_boss(1, "Gatekeeper", 10, 0, 5).await;
        let campaign = CampaignService::new(engine.ctx());

        campaign.deal_campaign_damage(user, 10).await.unwrap();
        assert!(matches!(
            campaign.deal_campaign_damage(user, 10).await.unwrap(),
            CampaignDamageOutcome::Complete { stage: 2 }
        ));
        assert!(matches!(
            campaign.get_campaign_status(user).await.unwrap(),
            CampaignStatus::Complete { stage: 2 }
        ));
        // Zero reward XP writes no audit row
        assert!(engine.state().await.xp_transactions.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_damage() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        assert!(matches!(
            CampaignService::new(engine.ctx())
                .deal_campaign_damage(user, 0)
                .await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let engine = TestEngine::new();
        engine.add_campaign_boss(1, "Gatekeeper", 500, 200, 50).await;
        let campaign = CampaignService::new(engine.ctx());
        let stranger = Uuid::new_v4();

        assert!(matches!(
            campaign.get_campaign_status(stranger).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            campaign.deal_campaign_damage(stranger, 10).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(engine.state().await.campaign.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_first_hits_pay_stage_once() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        engine.add_campaign_boss(1, "Gatekeeper", 100, 200, 50).await;
        engine.add_campaign_boss(2, "Warden", 10_000, 300, 80).await;
        let campaign = Arc::new(CampaignService::new(engine.ctx()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let campaign = campaign.clone();
                tokio::spawn(async move { campaign.deal_campaign_damage(user, 150).await })
            })
            .collect();

        let mut stage_one_kills = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if matches!(outcome, CampaignDamageOutcome::Defeated { stage: 1, .. }) {
                stage_one_kills += 1;
            }
        }
        assert_eq!(stage_one_kills, 1);

        let balance = engine.balance(user).await;
        assert_eq!((balance.experience, balance.gold), (200, 50));
        let progress = engine.state().await.campaign.get(&user).cloned().unwrap();
        assert_eq!(progress.current_stage, 2);
        assert_eq!(progress.current_boss_health, Some(10_000 - 3 * 150));
    }
}
