//! In-memory ledger store
//!
//! One async mutex guards the whole ledger. A transaction holds the guard
//! for its lifetime and works on a copy that replaces the shared state on
//! commit, so every unit of work is serialized and all-or-nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use grindstone::{
    ActiveBuff, ActivityRepository, BalanceRepository, BossEncounter, BossRepository,
    BossTemplate, CampaignBoss, CampaignProgress, CampaignRepository, DomainError,
    EncounterState, InventoryEntry, Item, LedgerStore, LedgerTx, MetricScore, PassiveStack, Quest,
    QuestRepository, QuestSelector, QuestStatus, Rarity, ShopRepository, SmugglerEvent,
    UserBalance, UserStats, XpTransaction,
};

#[derive(Debug, Clone)]
pub struct DailyLogRecord {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub perfect: bool,
}

#[derive(Debug, Clone)]
pub struct TrackedMetric {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct MetricScoreRecord {
    pub user_id: Uuid,
    pub metric_id: Uuid,
    pub date: NaiveDate,
    pub score: i64,
}

/// Everything the ledger holds
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub balances: HashMap<Uuid, UserBalance>,
    pub xp_transactions: Vec<XpTransaction>,
    pub daily_logs: Vec<DailyLogRecord>,
    pub longest_streaks: HashMap<Uuid, i64>,
    pub metrics: Vec<TrackedMetric>,
    pub metric_scores: Vec<MetricScoreRecord>,
    pub boss_templates: Vec<BossTemplate>,
    pub encounters: Vec<BossEncounter>,
    pub penalty_days: HashSet<(Uuid, NaiveDate)>,
    pub campaign: HashMap<Uuid, CampaignProgress>,
    pub campaign_bosses: Vec<CampaignBoss>,
    pub quests: Vec<Quest>,
    pub items: Vec<Item>,
    pub inventory: HashMap<(Uuid, Uuid), i32>,
    pub passive_stacks: HashMap<(Uuid, Uuid), i32>,
    pub buffs: Vec<ActiveBuff>,
    pub smuggler_events: Vec<SmugglerEvent>,
    /// Makes `activity_stats` fail, to exercise best-effort evaluation
    pub fail_activity_stats: bool,
}

#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state
    pub async fn snapshot(&self) -> LedgerState {
        self.state.lock().await.clone()
    }

    /// Edit the committed state directly
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut LedgerState),
    {
        f(&mut *self.state.lock().await);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryLedgerTx { guard, working }))
    }
}

pub struct MemoryLedgerTx {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let MemoryLedgerTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl BalanceRepository for MemoryLedgerTx {
    async fn find_balance(&mut self, user_id: Uuid) -> Result<Option<UserBalance>, DomainError> {
        Ok(self.working.balances.get(&user_id).cloned())
    }

    async fn lock_balance(&mut self, user_id: Uuid) -> Result<Option<UserBalance>, DomainError> {
        self.find_balance(user_id).await
    }

    async fn save_balance(&mut self, balance: &UserBalance) -> Result<(), DomainError> {
        self.working.balances.insert(balance.user_id, balance.clone());
        Ok(())
    }

    async fn insert_xp_transaction(&mut self, entry: &XpTransaction) -> Result<(), DomainError> {
        self.working.xp_transactions.push(entry.clone());
        Ok(())
    }

    async fn credit_gold(
        &mut self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Option<i64>, DomainError> {
        Ok(self.working.balances.get_mut(&user_id).map(|b| {
            b.gold += amount;
            b.gold
        }))
    }

    async fn debit_gold(&mut self, user_id: Uuid, amount: i64) -> Result<Option<i64>, DomainError> {
        Ok(self
            .working
            .balances
            .get_mut(&user_id)
            .filter(|b| b.gold >= amount)
            .map(|b| {
                b.gold -= amount;
                b.gold
            }))
    }
}

/// Longest run of consecutive dates
fn longest_run(mut dates: Vec<NaiveDate>) -> i64 {
    dates.sort();
    dates.dedup();
    let (mut best, mut run) = (0, 0);
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        run = match previous {
            Some(p) if (date - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(date);
    }
    best
}

#[async_trait]
impl ActivityRepository for MemoryLedgerTx {
    async fn activity_stats(&mut self, user_id: Uuid) -> Result<UserStats, DomainError> {
        if self.working.fail_activity_stats {
            return Err(DomainError::Repository("activity stats unavailable".into()));
        }
        let logs: Vec<&DailyLogRecord> = self
            .working
            .daily_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .collect();
        let recorded = self
            .working
            .longest_streaks
            .get(&user_id)
            .copied()
            .unwrap_or(0);

        Ok(UserStats {
            total_logs: logs.len() as i64,
            longest_streak: recorded.max(longest_run(logs.iter().map(|l| l.date).collect())),
            perfect_days: logs.iter().filter(|l| l.perfect).count() as i64,
            level: 0,
        })
    }

    async fn last_scored_date(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<NaiveDate>, DomainError> {
        Ok(self
            .working
            .daily_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.date)
            .max())
    }

    async fn metric_scores_since(
        &mut self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<MetricScore>, DomainError> {
        Ok(self
            .working
            .metrics
            .iter()
            .filter(|m| m.is_active)
            .map(|m| MetricScore {
                metric_id: m.id,
                metric_name: m.name.clone(),
                total_score: self
                    .working
                    .metric_scores
                    .iter()
                    .filter(|s| s.user_id == user_id && s.metric_id == m.id && s.date >= since)
                    .map(|s| s.score)
                    .sum(),
            })
            .collect())
    }
}

#[async_trait]
impl BossRepository for MemoryLedgerTx {
    async fn boss_templates(&mut self) -> Result<Vec<BossTemplate>, DomainError> {
        Ok(self.working.boss_templates.clone())
    }

    async fn find_boss_template(&mut self, id: Uuid) -> Result<Option<BossTemplate>, DomainError> {
        Ok(self
            .working
            .boss_templates
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn lock_active_encounter(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<BossEncounter>, DomainError> {
        Ok(self
            .working
            .encounters
            .iter()
            .find(|e| e.user_id == user_id && e.state() == EncounterState::Active)
            .cloned())
    }

    async fn lock_encounter(
        &mut self,
        user_id: Uuid,
        encounter_id: Uuid,
    ) -> Result<Option<BossEncounter>, DomainError> {
        Ok(self
            .working
            .encounters
            .iter()
            .find(|e| e.id == encounter_id && e.user_id == user_id)
            .cloned())
    }

    async fn insert_encounter(&mut self, encounter: &BossEncounter) -> Result<(), DomainError> {
        if encounter.state() == EncounterState::Active
            && self
                .working
                .encounters
                .iter()
                .any(|e| e.user_id == encounter.user_id && e.state() == EncounterState::Active)
        {
            return Err(DomainError::Repository(
                "duplicate active encounter".to_string(),
            ));
        }
        self.working.encounters.push(encounter.clone());
        Ok(())
    }

    async fn save_encounter(&mut self, encounter: &BossEncounter) -> Result<(), DomainError> {
        let slot = self
            .working
            .encounters
            .iter_mut()
            .find(|e| e.id == encounter.id)
            .ok_or_else(|| DomainError::not_found("BossEncounter", encounter.id))?;
        *slot = encounter.clone();
        Ok(())
    }

    async fn claim_penalty_day(
        &mut self,
        encounter_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, DomainError> {
        Ok(self.working.penalty_days.insert((encounter_id, date)))
    }
}

#[async_trait]
impl CampaignRepository for MemoryLedgerTx {
    async fn lock_campaign_progress(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<CampaignProgress>, DomainError> {
        Ok(self.working.campaign.get(&user_id).cloned())
    }

    async fn create_campaign_progress(
        &mut self,
        progress: &CampaignProgress,
    ) -> Result<(), DomainError> {
        self.working
            .campaign
            .entry(progress.user_id)
            .or_insert_with(|| progress.clone());
        Ok(())
    }

    async fn save_campaign_progress(
        &mut self,
        progress: &CampaignProgress,
    ) -> Result<(), DomainError> {
        self.working
            .campaign
            .insert(progress.user_id, progress.clone());
        Ok(())
    }

    async fn campaign_boss(&mut self, stage: i32) -> Result<Option<CampaignBoss>, DomainError> {
        Ok(self
            .working
            .campaign_bosses
            .iter()
            .find(|b| b.stage == stage)
            .cloned())
    }
}

#[async_trait]
impl QuestRepository for MemoryLedgerTx {
    async fn list_quests(&mut self, user_id: Uuid) -> Result<Vec<Quest>, DomainError> {
        let mut quests: Vec<Quest> = self
            .working
            .quests
            .iter()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        quests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quests)
    }

    async fn count_active_quests(&mut self, user_id: Uuid) -> Result<usize, DomainError> {
        Ok(self
            .working
            .quests
            .iter()
            .filter(|q| q.user_id == user_id && q.status == QuestStatus::Active)
            .count())
    }

    async fn delete_expired_quests(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let before = self.working.quests.len();
        self.working.quests.retain(|q| {
            !(q.user_id == user_id && q.status == QuestStatus::Active && q.is_expired(now))
        });
        Ok((before - self.working.quests.len()) as u64)
    }

    async fn insert_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        self.working.quests.push(quest.clone());
        Ok(())
    }

    async fn lock_active_quests_for_metric(
        &mut self,
        user_id: Uuid,
        metric_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Quest>, DomainError> {
        Ok(self
            .working
            .quests
            .iter()
            .filter(|q| {
                q.user_id == user_id
                    && q.metric_id == metric_id
                    && q.status == QuestStatus::Active
                    && !q.is_expired(now)
            })
            .cloned()
            .collect())
    }

    async fn save_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        let slot = self
            .working
            .quests
            .iter_mut()
            .find(|q| q.id == quest.id)
            .ok_or_else(|| DomainError::not_found("Quest", quest.id))?;
        *slot = quest.clone();
        Ok(())
    }

    async fn delete_active_quests(
        &mut self,
        user_id: Uuid,
        selector: QuestSelector,
    ) -> Result<u64, DomainError> {
        let before = self.working.quests.len();
        self.working.quests.retain(|q| {
            let matches = q.user_id == user_id
                && q.status == QuestStatus::Active
                && match selector {
                    QuestSelector::One(id) => q.id == id,
                    QuestSelector::All => true,
                };
            !matches
        });
        Ok((before - self.working.quests.len()) as u64)
    }
}

#[async_trait]
impl ShopRepository for MemoryLedgerTx {
    async fn list_items(&mut self) -> Result<Vec<Item>, DomainError> {
        Ok(self.working.items.clone())
    }

    async fn find_item(&mut self, item_id: Uuid) -> Result<Option<Item>, DomainError> {
        Ok(self.working.items.iter().find(|i| i.id == item_id).cloned())
    }

    async fn items_by_rarity(&mut self, rarity: Rarity) -> Result<Vec<Item>, DomainError> {
        Ok(self
            .working
            .items
            .iter()
            .filter(|i| i.rarity == rarity)
            .cloned()
            .collect())
    }

    async fn inventory(&mut self, user_id: Uuid) -> Result<Vec<InventoryEntry>, DomainError> {
        // Catalog order keeps listings stable
        Ok(self
            .working
            .items
            .iter()
            .filter_map(|item| {
                self.working
                    .inventory
                    .get(&(user_id, item.id))
                    .map(|&quantity| InventoryEntry {
                        user_id,
                        item_id: item.id,
                        quantity,
                    })
            })
            .collect())
    }

    async fn inventory_quantity(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<i32, DomainError> {
        Ok(self
            .working
            .inventory
            .get(&(user_id, item_id))
            .copied()
            .unwrap_or(0))
    }

    async fn add_inventory(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<i32, DomainError> {
        let slot = self.working.inventory.entry((user_id, item_id)).or_insert(0);
        *slot += quantity;
        Ok(*slot)
    }

    async fn take_inventory(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<i32>, DomainError> {
        Ok(self
            .working
            .inventory
            .get_mut(&(user_id, item_id))
            .filter(|q| **q > 0)
            .map(|q| {
                *q -= 1;
                *q
            }))
    }

    async fn passive_stacks(&mut self, user_id: Uuid) -> Result<Vec<PassiveStack>, DomainError> {
        Ok(self
            .working
            .items
            .iter()
            .filter_map(|item| {
                self.working
                    .passive_stacks
                    .get(&(user_id, item.id))
                    .map(|&stacks| PassiveStack {
                        user_id,
                        item_id: item.id,
                        stacks,
                    })
            })
            .collect())
    }

    async fn passive_stack_count(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<i32, DomainError> {
        Ok(self
            .working
            .passive_stacks
            .get(&(user_id, item_id))
            .copied()
            .unwrap_or(0))
    }

    async fn increment_passive_stack(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        max_stacks: i32,
    ) -> Result<Option<i32>, DomainError> {
        let slot = self
            .working
            .passive_stacks
            .entry((user_id, item_id))
            .or_insert(0);
        if *slot >= max_stacks {
            return Ok(None);
        }
        *slot += 1;
        Ok(Some(*slot))
    }

    async fn active_buffs(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveBuff>, DomainError> {
        Ok(self
            .working
            .buffs
            .iter()
            .filter(|b| b.user_id == user_id && b.is_active(now))
            .cloned()
            .collect())
    }

    async fn insert_buff(&mut self, buff: &ActiveBuff) -> Result<(), DomainError> {
        self.working.buffs.push(buff.clone());
        Ok(())
    }

    async fn insert_buff_if_none_active(
        &mut self,
        buff: &ActiveBuff,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let running = self.working.buffs.iter().any(|b| {
            b.user_id == buff.user_id && b.item_id == buff.item_id && b.is_active(now)
        });
        if running {
            return Ok(false);
        }
        self.working.buffs.push(buff.clone());
        Ok(true)
    }

    async fn delete_expired_buffs(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let before = self.working.buffs.len();
        self.working
            .buffs
            .retain(|b| b.user_id != user_id || b.is_active(now));
        Ok((before - self.working.buffs.len()) as u64)
    }

    async fn active_smuggler_event(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SmugglerEvent>, DomainError> {
        Ok(self
            .working
            .smuggler_events
            .iter()
            .filter(|e| e.user_id == user_id && !e.is_expired(now))
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn find_smuggler_event(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<SmugglerEvent>, DomainError> {
        Ok(self
            .working
            .smuggler_events
            .iter()
            .find(|e| e.id == event_id && e.user_id == user_id)
            .cloned())
    }

    async fn insert_smuggler_event(&mut self, event: &SmugglerEvent) -> Result<(), DomainError> {
        self.working.smuggler_events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grindstone::ItemEffect;

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        store
            .update(|s| {
                s.balances.insert(user, UserBalance::new(user));
            })
            .await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.credit_gold(user, 50).await.unwrap();
        }
        assert_eq!(store.snapshot().await.balances[&user].gold, 0);

        let mut tx = store.begin().await.unwrap();
        tx.credit_gold(user, 50).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.snapshot().await.balances[&user].gold, 50);
    }

    #[tokio::test]
    async fn test_guarded_updates() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();
        let mut tx = store.begin().await.unwrap();

        assert_eq!(tx.debit_gold(user, 1).await.unwrap(), None);
        assert_eq!(tx.take_inventory(user, item).await.unwrap(), None);
        assert_eq!(tx.increment_passive_stack(user, item, 1).await.unwrap(), Some(1));
        assert_eq!(tx.increment_passive_stack(user, item, 1).await.unwrap(), None);

        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(tx.claim_penalty_day(item, date).await.unwrap());
        assert!(!tx.claim_penalty_day(item, date).await.unwrap());

        let now = Utc::now();
        let buff = |expires_at| ActiveBuff {
            id: Uuid::new_v4(),
            user_id: user,
            item_id: item,
            effect: ItemEffect::FreezeStreak,
            effect_value: 0,
            expires_at,
        };
        let later = now + chrono::Duration::days(14);
        assert!(tx.insert_buff_if_none_active(&buff(later), now).await.unwrap());
        assert!(!tx.insert_buff_if_none_active(&buff(later), now).await.unwrap());
        assert!(tx
            .insert_buff_if_none_active(&buff(later), later)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_create_campaign_progress_never_overwrites() {
        let store = MemoryLedgerStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = store.begin().await.unwrap();

        let mut advanced = CampaignProgress::new(user, now);
        advanced.advance(now);
        tx.create_campaign_progress(&advanced).await.unwrap();
        tx.create_campaign_progress(&CampaignProgress::new(user, now))
            .await
            .unwrap();

        let stored = tx.lock_campaign_progress(user).await.unwrap().unwrap();
        assert_eq!(stored.current_stage, advanced.current_stage);
    }

    #[test]
    fn test_longest_run() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
        assert_eq!(longest_run(vec![]), 0);
        assert_eq!(longest_run(vec![d(1), d(2), d(3), d(5), d(6)]), 3);
        assert_eq!(longest_run(vec![d(4), d(2), d(3), d(3)]), 3);
    }
}
