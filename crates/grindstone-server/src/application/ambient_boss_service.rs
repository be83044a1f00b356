//! Ambient Boss Application Service
//!
//! Single-instance encounters per user, spawned by missed days, worn down by
//! focused work, and draining XP once per calendar day while alive.
//!
//! `NoEncounter → Active → Defeated`. Defeated encounters stay in the store
//! as history.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use grindstone::{
    ActivityRepository, BalanceRepository, BossEncounter, BossRepository, BossTemplate,
    DomainError, EncounterState, EngineEvent, Item, ItemEffect, LedgerStore, LedgerTx,
    ShopRepository, XpReason,
};

use super::currency_service::credit_gold_in;
use super::shop_service::{grant_item, roll_loot};
use super::xp_service::{apply_experience, XpAward};
use super::EngineContext;

/// Rewards paid when an ambient boss falls
#[derive(Debug, Clone, Serialize)]
pub struct BossReward {
    pub xp: Option<XpAward>,
    pub gold: i64,
    pub gold_balance: i64,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AmbientDamageOutcome {
    Damaged {
        encounter: BossEncounter,
        damage: i32,
    },
    Defeated {
        encounter: BossEncounter,
        damage: i32,
        reward: BossReward,
    },
    /// The encounter was already defeated; nothing changed
    NotActive { encounter_id: Uuid },
}

impl AmbientDamageOutcome {
    pub fn is_defeat(&self) -> bool {
        matches!(self, AmbientDamageOutcome::Defeated { .. })
    }
}

/// One applied daily penalty
#[derive(Debug, Clone, Serialize)]
pub struct PenaltyTick {
    pub encounter_id: Uuid,
    pub date: NaiveDate,
    pub base_penalty: i64,
    pub ward_stacks: i64,
    pub penalty_xp: i64,
    pub xp: Option<XpAward>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmbientBossView {
    pub encounter: BossEncounter,
    pub daily_penalty_xp: i64,
    /// Penalty applied while serving this read, if today's was still due
    pub penalty: Option<PenaltyTick>,
}

/// Spawn an encounter if the user has gone quiet long enough.
///
/// Expects the caller to have checked there is no active encounter.
pub(crate) async fn spawn_if_due_in(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Option<(BossEncounter, BossTemplate)>, DomainError> {
    let Some(last_scored) = tx.last_scored_date(user_id).await? else {
        return Ok(None);
    };
    let days_missed = (today - last_scored).num_days();
    if days_missed < 2 {
        return Ok(None);
    }

    let templates = tx.boss_templates().await?;
    let chosen = templates
        .into_iter()
        .filter(|t| t.spawn_condition.matches(days_missed))
        .fold(None, |best: Option<BossTemplate>, t| match best {
            Some(b) if b.spawn_condition.severity() >= t.spawn_condition.severity() => Some(b),
            _ => Some(t),
        });

    let Some(template) = chosen else {
        return Ok(None);
    };

    let encounter = BossEncounter::spawn(user_id, &template, now);
    tx.insert_encounter(&encounter).await?;
    tracing::info!(
        "👹 {} spawned for {} after {} missed days",
        template.name,
        user_id,
        days_missed
    );

    Ok(Some((encounter, template)))
}

/// Apply today's penalty for an active encounter, at most once per date.
pub(crate) async fn tick_in(
    tx: &mut dyn LedgerTx,
    encounter: &BossEncounter,
    ward_reduction_per_stack: i64,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Option<PenaltyTick>, DomainError> {
    if encounter.state() != EncounterState::Active {
        return Ok(None);
    }
    if !tx.claim_penalty_day(encounter.id, today).await? {
        return Ok(None);
    }

    let template = tx
        .find_boss_template(encounter.template_id)
        .await?
        .ok_or_else(|| DomainError::not_found("BossTemplate", encounter.template_id))?;

    let ward_stacks = passive_effect_stacks(tx, encounter.user_id, ItemEffect::PenaltyWard)
        .await?
        .into_iter()
        .map(|(_, stacks)| i64::from(stacks))
        .sum::<i64>();
    let penalty_xp =
        (template.daily_penalty_xp - ward_reduction_per_stack * ward_stacks).max(0);

    let xp = if penalty_xp > 0 {
        Some(
            apply_experience(
                tx,
                encounter.user_id,
                -penalty_xp,
                XpReason::BossPenalty { date: today },
                now,
            )
            .await?,
        )
    } else {
        None
    };

    tracing::info!(
        "{} drained {} XP from {} on {} ({} ward stacks)",
        encounter.boss_name,
        penalty_xp,
        encounter.user_id,
        today,
        ward_stacks
    );

    Ok(Some(PenaltyTick {
        encounter_id: encounter.id,
        date: today,
        base_penalty: template.daily_penalty_xp,
        ward_stacks,
        penalty_xp,
        xp,
    }))
}

/// Damage an active encounter, paying out on defeat.
pub(crate) async fn damage_in<S: LedgerStore>(
    tx: &mut dyn LedgerTx,
    ctx: &EngineContext<S>,
    mut encounter: BossEncounter,
    amount: i32,
    now: DateTime<Utc>,
) -> Result<(AmbientDamageOutcome, Vec<EngineEvent>), DomainError> {
    if encounter.state() == EncounterState::Defeated {
        return Ok((
            AmbientDamageOutcome::NotActive {
                encounter_id: encounter.id,
            },
            Vec::new(),
        ));
    }

    let user_id = encounter.user_id;
    let state = encounter.take_damage(amount, now);
    tx.save_encounter(&encounter).await?;

    if state == EncounterState::Active {
        let events = vec![EngineEvent::BossDamaged {
            user_id,
            encounter_id: encounter.id,
            boss_name: encounter.boss_name.clone(),
            damage: amount,
            remaining_health: encounter.current_health,
        }];
        return Ok((
            AmbientDamageOutcome::Damaged {
                encounter,
                damage: amount,
            },
            events,
        ));
    }

    let template = tx.find_boss_template(encounter.template_id).await?;
    let reward_xp = template.as_ref().map(|t| t.reward_xp).unwrap_or(0);
    let reward_rarity = template.as_ref().and_then(|t| t.reward_item_rarity);

    let xp = if reward_xp > 0 {
        Some(
            apply_experience(
                tx,
                user_id,
                reward_xp,
                XpReason::BossDefeated {
                    name: encounter.boss_name.clone(),
                },
                now,
            )
            .await?,
        )
    } else {
        None
    };

    let gold = ctx.config.ambient_gold_bounty;
    let gold_balance = credit_gold_in(tx, user_id, gold).await?;

    let item = match roll_loot(tx, ctx.random.as_ref(), reward_rarity).await? {
        Some(item) => grant_item(tx, user_id, item).await?,
        None => None,
    };

    tracing::info!(
        "⚔️ {} defeated {} (+{} XP, +{} gold, item: {:?})",
        user_id,
        encounter.boss_name,
        reward_xp,
        gold,
        item.as_ref().map(|i| i.name.as_str())
    );

    let mut events = vec![EngineEvent::BossDefeated {
        user_id,
        encounter_id: encounter.id,
        boss_name: encounter.boss_name.clone(),
        xp_reward: reward_xp,
        gold_reward: gold,
        item_name: item.as_ref().map(|i| i.name.clone()),
    }];
    if let Some(award) = &xp {
        events.extend(award.events());
    }

    Ok((
        AmbientDamageOutcome::Defeated {
            encounter,
            damage: amount,
            reward: BossReward {
                xp,
                gold,
                gold_balance,
                item,
            },
        },
        events,
    ))
}

/// Held passive items carrying `effect`, with their stack counts
pub(crate) async fn passive_effect_stacks(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    effect: ItemEffect,
) -> Result<Vec<(Item, i32)>, DomainError> {
    let stacks = tx.passive_stacks(user_id).await?;
    let mut found = Vec::new();
    for stack in stacks.into_iter().filter(|s| s.stacks > 0) {
        if let Some(item) = tx.find_item(stack.item_id).await? {
            if item.effect == effect {
                found.push((item, stack.stacks));
            }
        }
    }
    Ok(found)
}

/// Application service for ambient boss encounters
pub struct AmbientBossService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> AmbientBossService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    /// The active encounter, spawning one or applying today's penalty as due
    pub async fn get_active_ambient_boss(
        &self,
        user_id: Uuid,
    ) -> Result<Option<AmbientBossView>, DomainError> {
        let now = self.ctx.now();
        let today = self.ctx.clock.today();
        let mut tx = self.ctx.begin().await?;

        // Serializes spawn checks per user
        tx.lock_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        let encounter = match tx.lock_active_encounter(user_id).await? {
            Some(active) => Some(active),
            None => spawn_if_due_in(tx.as_mut(), user_id, today, now)
                .await?
                .map(|(encounter, _)| encounter),
        };

        let Some(encounter) = encounter else {
            tx.commit().await?;
            return Ok(None);
        };

        let penalty = tick_in(
            tx.as_mut(),
            &encounter,
            self.ctx.config.ward_reduction_per_stack,
            today,
            now,
        )
        .await?;
        let daily_penalty_xp = tx
            .find_boss_template(encounter.template_id)
            .await?
            .map(|t| t.daily_penalty_xp)
            .unwrap_or(0);
        tx.commit().await?;

        if let Some(award) = penalty.as_ref().and_then(|p| p.xp.as_ref()) {
            self.ctx.publish(&award.events()).await;
        }

        Ok(Some(AmbientBossView {
            encounter,
            daily_penalty_xp,
            penalty,
        }))
    }

    /// Spawn an encounter when the missed-days signal fires. No-op while one is active.
    pub async fn spawn_if_due(&self, user_id: Uuid) -> Result<Option<BossEncounter>, DomainError> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;
        tx.lock_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if tx.lock_active_encounter(user_id).await?.is_some() {
            tx.commit().await?;
            return Ok(None);
        }

        let spawned = spawn_if_due_in(tx.as_mut(), user_id, self.ctx.clock.today(), now).await?;
        tx.commit().await?;
        Ok(spawned.map(|(encounter, _)| encounter))
    }

    /// Deal damage to a specific encounter
    pub async fn deal_ambient_boss_damage(
        &self,
        user_id: Uuid,
        encounter_id: Uuid,
        amount: i32,
    ) -> Result<AmbientDamageOutcome, DomainError> {
        DomainError::require_positive("damage", i64::from(amount))?;

        let mut tx = self.ctx.begin().await?;
        let encounter = tx
            .lock_encounter(user_id, encounter_id)
            .await?
            .ok_or_else(|| DomainError::not_found("BossEncounter", encounter_id))?;

        let (outcome, events) =
            damage_in(tx.as_mut(), &self.ctx, encounter, amount, self.ctx.now()).await?;
        tx.commit().await?;

        self.ctx.publish(&events).await;
        Ok(outcome)
    }

    /// Apply today's penalty. A second call on the same date is a silent no-op.
    pub async fn tick_daily_boss_penalty(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PenaltyTick>, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let Some(encounter) = tx.lock_active_encounter(user_id).await? else {
            tx.commit().await?;
            return Ok(None);
        };

        let tick = tick_in(
            tx.as_mut(),
            &encounter,
            self.ctx.config.ward_reduction_per_stack,
            self.ctx.clock.today(),
            self.ctx.now(),
        )
        .await?;
        tx.commit().await?;

        if let Some(award) = tick.as_ref().and_then(|t| t.xp.as_ref()) {
            self.ctx.publish(&award.events()).await;
        }
        Ok(tick)
    }
}
