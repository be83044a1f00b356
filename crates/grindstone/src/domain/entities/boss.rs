//! Boss - Ambient encounters and the campaign ladder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Rarity;

/// When an ambient boss template may spawn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "days", rename_all = "snake_case")]
pub enum SpawnCondition {
    /// The most recent scored day is at least this many calendar days old
    MissedDays(i64),
}

impl SpawnCondition {
    pub fn matches(&self, days_missed: i64) -> bool {
        match *self {
            SpawnCondition::MissedDays(n) => days_missed >= n,
        }
    }

    /// Orders matching templates; the most demanding condition wins
    pub fn severity(&self) -> i64 {
        match *self {
            SpawnCondition::MissedDays(n) => n,
        }
    }
}

/// Ambient boss template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTemplate {
    pub id: Uuid,
    pub name: String,
    pub max_health: i32,
    pub daily_penalty_xp: i64,
    pub reward_xp: i64,
    pub reward_item_rarity: Option<Rarity>,
    pub spawn_condition: SpawnCondition,
}

/// Explicit encounter state; `defeated_at` is only the historical record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncounterState {
    Active,
    Defeated,
}

/// One live (or historical) ambient boss bound to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossEncounter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub boss_name: String,
    pub max_health: i32,
    pub current_health: i32,
    pub spawned_at: DateTime<Utc>,
    pub defeated_at: Option<DateTime<Utc>>,
}

impl BossEncounter {
    pub fn spawn(user_id: Uuid, template: &BossTemplate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            template_id: template.id,
            boss_name: template.name.clone(),
            max_health: template.max_health,
            current_health: template.max_health,
            spawned_at: now,
            defeated_at: None,
        }
    }

    pub fn state(&self) -> EncounterState {
        if self.defeated_at.is_some() {
            EncounterState::Defeated
        } else {
            EncounterState::Active
        }
    }

    /// Applies damage clamped at zero. Returns the new state.
    pub fn take_damage(&mut self, amount: i32, now: DateTime<Utc>) -> EncounterState {
        if self.state() == EncounterState::Defeated {
            return EncounterState::Defeated;
        }
        self.current_health = self.current_health.saturating_sub(amount).max(0);
        if self.current_health == 0 {
            self.defeated_at = Some(now);
        }
        self.state()
    }
}

/// Campaign boss, keyed by stage number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignBoss {
    pub stage: i32,
    pub name: String,
    pub max_health: i32,
    pub reward_xp: i64,
    pub reward_gold: i64,
    pub reward_item_rarity: Option<Rarity>,
}

/// Per-user campaign position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignProgress {
    pub user_id: Uuid,
    pub current_stage: i32,
    /// `None` until the stage boss is first read
    pub current_boss_health: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignProgress {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            current_stage: 1,
            current_boss_health: None,
            updated_at: now,
        }
    }

    /// Lazily fills in health for the current stage boss
    pub fn health_against(&mut self, boss: &CampaignBoss) -> i32 {
        *self.current_boss_health.get_or_insert(boss.max_health)
    }

    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.current_stage += 1;
        self.current_boss_health = None;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(max_health: i32) -> BossTemplate {
        BossTemplate {
            id: Uuid::new_v4(),
            name: "Procrastination Hydra".to_string(),
            max_health,
            daily_penalty_xp: 50,
            reward_xp: 500,
            reward_item_rarity: Some(Rarity::Rare),
            spawn_condition: SpawnCondition::MissedDays(2),
        }
    }

    #[test]
    fn test_damage_clamps_and_defeats() {
        let now = Utc::now();
        let mut encounter = BossEncounter::spawn(Uuid::new_v4(), &template(100), now);
        assert_eq!(encounter.take_damage(40, now), EncounterState::Active);
        assert_eq!(encounter.current_health, 60);

        assert_eq!(encounter.take_damage(70, now), EncounterState::Defeated);
        assert_eq!(encounter.current_health, 0);
        assert_eq!(encounter.defeated_at, Some(now));

        // Defeated encounters do not move
        assert_eq!(encounter.take_damage(10, Utc::now()), EncounterState::Defeated);
        assert_eq!(encounter.defeated_at, Some(now));
    }

    #[test]
    fn test_spawn_condition() {
        let cond = SpawnCondition::MissedDays(2);
        assert!(!cond.matches(1));
        assert!(cond.matches(2));
        assert!(cond.matches(9));
    }

    #[test]
    fn test_campaign_lazy_health() {
        let now = Utc::now();
        let boss = CampaignBoss {
            stage: 1,
            name: "Gatekeeper".to_string(),
            max_health: 300,
            reward_xp: 200,
            reward_gold: 50,
            reward_item_rarity: None,
        };
        let mut progress = CampaignProgress::new(Uuid::new_v4(), now);
        assert_eq!(progress.current_boss_health, None);
        assert_eq!(progress.health_against(&boss), 300);
        assert_eq!(progress.current_boss_health, Some(300));

        progress.advance(now);
        assert_eq!(progress.current_stage, 2);
        assert_eq!(progress.current_boss_health, None);
    }
}
