//! Test harness: an engine over the in-memory ledger with a settable
//! clock, scriptable randomness and a publisher that records events.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use grindstone::{
    BossEncounter, BossTemplate, CampaignBoss, Clock, DomainError, EngineEvent, EventPublisher,
    Item, RandomSource, Rarity, SpawnCondition, UserBalance,
};

use crate::adapters::memory::{
    DailyLogRecord, LedgerState, MemoryLedgerStore, MetricScoreRecord, TrackedMetric,
};
use crate::adapters::RngSource;
use crate::config::EngineConfig;

use super::EngineContext;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Mutex::new(at))
    }

    pub fn advance(&self, by: Duration) {
        *locked(&self.0) += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *locked(&self.0)
    }
}

/// Replays queued draws, then falls back to a seeded generator
pub struct ScriptedRandom {
    ranges: Mutex<VecDeque<i64>>,
    chances: Mutex<VecDeque<bool>>,
    fallback: RngSource,
}

impl ScriptedRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            ranges: Mutex::new(VecDeque::new()),
            chances: Mutex::new(VecDeque::new()),
            fallback: RngSource::seeded(seed),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn range_inclusive(&self, low: i64, high: i64) -> i64 {
        match locked(&self.ranges).pop_front() {
            Some(v) => v.clamp(low, high.max(low)),
            None => self.fallback.range_inclusive(low, high),
        }
    }

    fn chance(&self, p: f64) -> bool {
        match locked(&self.chances).pop_front() {
            Some(v) => v,
            None => self.fallback.chance(p),
        }
    }
}

#[derive(Default)]
pub struct RecordingPublisher(Mutex<Vec<EngineEvent>>);

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &EngineEvent) -> Result<(), DomainError> {
        locked(&self.0).push(event.clone());
        Ok(())
    }
}

pub struct TestEngine {
    store: MemoryLedgerStore,
    clock: Arc<FixedClock>,
    random: Arc<ScriptedRandom>,
    events: Arc<RecordingPublisher>,
    ctx: Arc<EngineContext<MemoryLedgerStore>>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = MemoryLedgerStore::new();
        let start = Utc
            .with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let clock = Arc::new(FixedClock::new(start));
        let random = Arc::new(ScriptedRandom::new(7));
        let events = Arc::new(RecordingPublisher::default());
        let ctx = Arc::new(EngineContext::new(
            Arc::new(store.clone()),
            random.clone(),
            clock.clone(),
            events.clone(),
            config,
        ));
        Self {
            store,
            clock,
            random,
            events,
            ctx,
        }
    }

    pub fn ctx(&self) -> Arc<EngineContext<MemoryLedgerStore>> {
        self.ctx.clone()
    }

    pub async fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn advance_clock(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn script_ranges(&self, values: &[i64]) {
        locked(&self.random.ranges).extend(values.iter().copied());
    }

    pub async fn script_chances(&self, values: &[bool]) {
        locked(&self.random.chances).extend(values.iter().copied());
    }

    pub async fn published(&self) -> Vec<EngineEvent> {
        locked(&self.events.0).clone()
    }

    pub async fn state(&self) -> LedgerState {
        self.store.snapshot().await
    }

    // --- Users ---

    pub async fn user_with(&self, experience: i64, gold: i64) -> Uuid {
        let user_id = Uuid::new_v4();
        let mut balance = UserBalance::new(user_id);
        balance.apply_experience_delta(experience);
        balance.gold = gold;
        self.store
            .update(|s| {
                s.balances.insert(user_id, balance);
            })
            .await;
        user_id
    }

    pub async fn balance(&self, user_id: Uuid) -> UserBalance {
        self.state()
            .await
            .balances
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| panic!("no balance for {user_id}"))
    }

    pub async fn grant_title(&self, user_id: Uuid, achievement_id: &str) {
        self.store
            .update(|s| {
                if let Some(b) = s.balances.get_mut(&user_id) {
                    b.titles.push(achievement_id.to_string());
                }
            })
            .await;
    }

    pub async fn set_active_title(&self, user_id: Uuid, achievement_id: &str) {
        self.store
            .update(|s| {
                if let Some(b) = s.balances.get_mut(&user_id) {
                    b.active_title = Some(achievement_id.to_string());
                }
            })
            .await;
    }

    // --- Activity ---

    /// `days` consecutive daily logs ending today
    pub async fn log_days(&self, user_id: Uuid, days: i64) {
        let today = self.clock.today();
        self.store
            .update(|s| {
                for offset in 0..days {
                    s.daily_logs.push(DailyLogRecord {
                        user_id,
                        date: today - Duration::days(offset),
                        perfect: false,
                    });
                }
                s.longest_streaks.insert(user_id, days);
            })
            .await;
    }

    /// One daily log `days_ago` days before today
    pub async fn log_day_ago(&self, user_id: Uuid, days_ago: i64) {
        let date = self.clock.today() - Duration::days(days_ago);
        self.store
            .update(|s| {
                s.daily_logs.push(DailyLogRecord {
                    user_id,
                    date,
                    perfect: false,
                })
            })
            .await;
    }

    pub async fn fail_activity_stats(&self, fail: bool) {
        self.store.update(|s| s.fail_activity_stats = fail).await;
    }

    pub async fn add_metric(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .update(|s| {
                s.metrics.push(TrackedMetric {
                    id,
                    name: name.to_string(),
                    is_active: true,
                })
            })
            .await;
        id
    }

    pub async fn score_metric(&self, user_id: Uuid, metric_id: Uuid, score: i64, days_ago: i64) {
        let date = self.clock.today() - Duration::days(days_ago);
        self.store
            .update(|s| {
                s.metric_scores.push(MetricScoreRecord {
                    user_id,
                    metric_id,
                    date,
                    score,
                })
            })
            .await;
    }

    // --- Bosses ---

    /// Template paying 500 XP and a rare drop
    pub async fn add_boss_template(
        &self,
        name: &str,
        max_health: i32,
        daily_penalty_xp: i64,
        spawn_condition: SpawnCondition,
    ) -> BossTemplate {
        let template = BossTemplate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            max_health,
            daily_penalty_xp,
            reward_xp: 500,
            reward_item_rarity: Some(Rarity::Rare),
            spawn_condition,
        };
        let stored = template.clone();
        self.store.update(|s| s.boss_templates.push(stored)).await;
        template
    }

    pub async fn add_encounter(&self, user_id: Uuid, template: &BossTemplate) -> BossEncounter {
        let encounter = BossEncounter::spawn(user_id, template, self.clock.now());
        let stored = encounter.clone();
        self.store.update(|s| s.encounters.push(stored)).await;
        encounter
    }

    /// Stage boss with a rare drop
    pub async fn add_campaign_boss(
        &self,
        stage: i32,
        name: &str,
        max_health: i32,
        reward_xp: i64,
        reward_gold: i64,
    ) {
        self.store
            .update(|s| {
                s.campaign_bosses.push(CampaignBoss {
                    stage,
                    name: name.to_string(),
                    max_health,
                    reward_xp,
                    reward_gold,
                    reward_item_rarity: Some(Rarity::Rare),
                })
            })
            .await;
    }

    // --- Items ---

    pub async fn add_item(&self, item: Item) -> Item {
        let stored = item.clone();
        self.store.update(|s| s.items.push(stored)).await;
        item
    }

    pub async fn give(&self, user_id: Uuid, item_id: Uuid, quantity: i32) {
        self.store
            .update(|s| {
                *s.inventory.entry((user_id, item_id)).or_insert(0) += quantity;
            })
            .await;
    }

    pub async fn inventory_quantity(&self, user_id: Uuid, item_id: Uuid) -> i32 {
        self.state()
            .await
            .inventory
            .get(&(user_id, item_id))
            .copied()
            .unwrap_or(0)
    }

    pub async fn set_stacks(&self, user_id: Uuid, item_id: Uuid, stacks: i32) {
        self.store
            .update(|s| {
                s.passive_stacks.insert((user_id, item_id), stacks);
            })
            .await;
    }

    pub async fn stacks(&self, user_id: Uuid, item_id: Uuid) -> i32 {
        self.state()
            .await
            .passive_stacks
            .get(&(user_id, item_id))
            .copied()
            .unwrap_or(0)
    }
}
