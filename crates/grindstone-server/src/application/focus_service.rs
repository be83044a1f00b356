//! Focus Session Application Service
//!
//! A completed focus session is the main source of XP and damage. The whole
//! fan-out (XP, ambient boss, campaign boss, quests) commits as one unit.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use grindstone::{BossRepository, DomainError, ItemEffect, LedgerStore, ShopRepository, XpReason};

use super::ambient_boss_service::{self, passive_effect_stacks, AmbientDamageOutcome};
use super::campaign_service::{self, CampaignDamageOutcome};
use super::quest_service::{advance_in, QuestProgress};
use super::xp_service::{apply_experience, XpAward};
use super::EngineContext;

#[derive(Debug, Clone, Serialize)]
pub struct FocusSessionResult {
    pub minutes: i64,
    pub xp: XpAward,
    pub damage: i32,
    pub gold_gained: i64,
    pub ambient: Option<AmbientDamageOutcome>,
    pub campaign: CampaignDamageOutcome,
    pub quests: Vec<QuestProgress>,
    pub messages: Vec<String>,
}

pub struct FocusService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> FocusService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    pub async fn complete_focus_session(
        &self,
        user_id: Uuid,
        minutes: i64,
        metric_id: Option<Uuid>,
    ) -> Result<FocusSessionResult, DomainError> {
        DomainError::require_positive("minutes", minutes)?;
        let max_minutes = self.ctx.config.max_focus_minutes;
        if minutes > max_minutes {
            return Err(DomainError::InvalidInput(format!(
                "minutes must be at most {max_minutes}, got {minutes}"
            )));
        }

        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;
        let mut messages = Vec::new();
        let mut events = Vec::new();
        let mut gold_gained = 0;

        let xp_boost = tx
            .active_buffs(user_id, now)
            .await?
            .iter()
            .filter(|b| b.effect == ItemEffect::XpBoost)
            .map(|b| i64::from(b.effect_value))
            .max()
            .unwrap_or(0);
        let xp_amount = minutes * self.ctx.config.focus_xp_per_minute * (100 + xp_boost) / 100;
        let xp = apply_experience(
            tx.as_mut(),
            user_id,
            xp_amount,
            XpReason::FocusSession { at: now },
            now,
        )
        .await?;
        messages.push(format!("+{} XP for {} focused minutes", xp.delta, minutes));
        if xp_boost > 0 {
            messages.push(format!("XP boost active (+{xp_boost}%)"));
        }
        if xp.leveled_up {
            messages.push(format!("Level up! You reached level {}", xp.level));
        }
        events.extend(xp.events());

        let damage_bonus: i64 = passive_effect_stacks(tx.as_mut(), user_id, ItemEffect::DamageBoost)
            .await?
            .iter()
            .map(|(item, stacks)| i64::from(*stacks) * i64::from(item.effect_value))
            .sum();
        let damage = i32::try_from((minutes * (100 + damage_bonus) / 100).max(1))
            .unwrap_or(i32::MAX);

        let ambient = match tx.lock_active_encounter(user_id).await? {
            Some(encounter) => {
                let (outcome, boss_events) =
                    ambient_boss_service::damage_in(tx.as_mut(), &self.ctx, encounter, damage, now)
                        .await?;
                match &outcome {
                    AmbientDamageOutcome::Damaged { encounter, .. } => messages.push(format!(
                        "Hit {} for {} ({} HP left)",
                        encounter.boss_name, damage, encounter.current_health
                    )),
                    AmbientDamageOutcome::Defeated {
                        encounter, reward, ..
                    } => {
                        gold_gained += reward.gold;
                        messages.push(format!("{} defeated!", encounter.boss_name));
                    }
                    AmbientDamageOutcome::NotActive { .. } => {}
                }
                events.extend(boss_events);
                Some(outcome)
            }
            None => None,
        };

        let (campaign, campaign_events) =
            campaign_service::damage_in(tx.as_mut(), &self.ctx, user_id, damage, now).await?;
        match &campaign {
            CampaignDamageOutcome::Damaged {
                boss_name,
                remaining_health,
                ..
            } => messages.push(format!(
                "Campaign: hit {boss_name} for {damage} ({remaining_health} HP left)"
            )),
            CampaignDamageOutcome::Defeated {
                boss_name,
                reward,
                next_stage,
                ..
            } => {
                gold_gained += reward.gold;
                messages.push(format!(
                    "Campaign: {boss_name} defeated, stage {next_stage} unlocked"
                ));
            }
            CampaignDamageOutcome::Complete { .. } => {}
        }
        events.extend(campaign_events);

        let quests = match metric_id {
            Some(metric_id) => {
                let (progress, quest_events) =
                    advance_in(tx.as_mut(), user_id, metric_id, now).await?;
                for p in progress.iter().filter(|p| p.completed) {
                    messages.push(format!("Quest complete: {}", p.quest.title));
                }
                events.extend(quest_events);
                progress
            }
            None => Vec::new(),
        };

        tx.commit().await?;

        tracing::info!(
            "⏱️ {} focused {} min: +{} XP, {} damage",
            user_id,
            minutes,
            xp.delta,
            damage
        );
        self.ctx.publish(&events).await;

        Ok(FocusSessionResult {
            minutes,
            xp,
            damage,
            gold_gained,
            ambient,
            campaign,
            quests,
            messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::TestEngine;
    use crate::application::QuestService;
    use chrono::Duration;
    use grindstone::{EngineEvent, Item, ItemCategory, Rarity, SpawnCondition};

    #[tokio::test]
    async fn test_plain_session() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        engine.add_campaign_boss(1, "Gatekeeper", 500, 200, 50).await;

        let result = FocusService::new(engine.ctx())
            .complete_focus_session(user, 25, None)
            .await
            .unwrap();
        assert_eq!(result.xp.delta, 50);
        assert_eq!(result.damage, 25);
        assert!(result.ambient.is_none());
        assert!(matches!(
            result.campaign,
            CampaignDamageOutcome::Damaged {
                remaining_health: 475,
                ..
            }
        ));
        assert_eq!(result.gold_gained, 0);

        let log = engine.state().await.xp_transactions;
        assert_eq!(log.len(), 1);
        assert!(log[0].reason.to_string().starts_with("focus_session:"));
    }

    #[tokio::test]
    async fn test_boosts_apply() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        let sword = engine
            .add_item(
                Item::new(
                    "Whetted Blade",
                    Rarity::Rare,
                    ItemCategory::CombatGear,
                    ItemEffect::DamageBoost,
                    400,
                )
                .with_effect_value(25)
                .with_max_stacks(4),
            )
            .await;
        engine.set_stacks(user, sword.id, 2).await;
        let draught = engine
            .add_item(
                Item::new(
                    "Focus Draught",
                    Rarity::Common,
                    ItemCategory::Consumable,
                    ItemEffect::XpBoost,
                    120,
                )
                .with_effect_value(100),
            )
            .await;
        engine.give(user, draught.id, 1).await;
        crate::application::ShopService::new(engine.ctx())
            .consume(user, draught.id)
            .await
            .unwrap();

        let result = FocusService::new(engine.ctx())
            .complete_focus_session(user, 30, None)
            .await
            .unwrap();
        assert_eq!(result.xp.delta, 120);
        assert_eq!(result.damage, 45);
        assert!(matches!(result.campaign, CampaignDamageOutcome::Complete { stage: 1 }));
    }

    #[tokio::test]
    async fn test_session_defeats_ambient_boss_and_advances_quest() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        let template = engine
            .add_boss_template("Procrastinox", 20, 30, SpawnCondition::MissedDays(2))
            .await;
        let encounter = engine.add_encounter(user, &template).await;
        let metric = engine.add_metric("Deep Work").await;
        engine.script_ranges(&[2]).await;
        let quests = QuestService::new(engine.ctx());
        quests.generate_quest(user).await.unwrap();
        quests.advance_quest(user, metric).await.unwrap();

        let result = FocusService::new(engine.ctx())
            .complete_focus_session(user, 20, Some(metric))
            .await
            .unwrap();

        assert!(result.ambient.as_ref().is_some_and(|o| o.is_defeat()));
        assert_eq!(result.gold_gained, 100);
        assert!(result.quests[0].completed);
        // 40 focus + 500 boss + 400 quest
        assert_eq!(engine.balance(user).await.experience, 940);

        let published = engine.published().await;
        assert!(published.iter().any(|e| matches!(
            e,
            EngineEvent::BossDefeated { encounter_id, .. } if *encounter_id == encounter.id
        )));
        assert!(published
            .iter()
            .any(|e| matches!(e, EngineEvent::QuestCompleted { .. })));
    }

    #[tokio::test]
    async fn test_rejects_bad_minutes() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        let focus = FocusService::new(engine.ctx());

        assert!(matches!(
            focus.complete_focus_session(user, 0, None).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            focus.complete_focus_session(user, 601, None).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(engine.state().await.xp_transactions.is_empty());
    }

    #[tokio::test]
    async fn test_expired_boost_ignored() {
        let engine = TestEngine::new();
        let user = engine.user_with(0, 0).await;
        let draught = engine
            .add_item(
                Item::new(
                    "Focus Draught",
                    Rarity::Common,
                    ItemCategory::Consumable,
                    ItemEffect::XpBoost,
                    120,
                )
                .with_effect_value(100),
            )
            .await;
        engine.give(user, draught.id, 1).await;
        crate::application::ShopService::new(engine.ctx())
            .consume(user, draught.id)
            .await
            .unwrap();
        engine.advance_clock(Duration::hours(25)).await;

        let result = FocusService::new(engine.ctx())
            .complete_focus_session(user, 10, None)
            .await
            .unwrap();
        assert_eq!(result.xp.delta, 20);
    }
}
