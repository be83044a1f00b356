//! Achievement - Static title catalog

use serde::Serialize;

use super::UserStats;

/// Predicate over a `UserStats` snapshot
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "threshold", rename_all = "snake_case")]
pub enum UnlockCondition {
    TotalLogs(i64),
    LongestStreak(i64),
    PerfectDays(i64),
    Level(i32),
}

impl UnlockCondition {
    pub fn is_met(&self, stats: &UserStats) -> bool {
        match *self {
            UnlockCondition::TotalLogs(n) => stats.total_logs >= n,
            UnlockCondition::LongestStreak(n) => stats.longest_streak >= n,
            UnlockCondition::PerfectDays(n) => stats.perfect_days >= n,
            UnlockCondition::Level(n) => stats.level >= n,
        }
    }
}

/// Catalog entry. Unlock state lives on the user's title set.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: i64,
    pub unlock_condition: UnlockCondition,
}

impl AchievementDefinition {
    pub fn find(id: &str) -> Option<&'static AchievementDefinition> {
        ACHIEVEMENTS.iter().find(|a| a.id == id)
    }
}

pub static ACHIEVEMENTS: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "first_log",
        title: "First Step",
        description: "Submit your first daily log",
        icon: "🌱",
        xp_reward: 50,
        unlock_condition: UnlockCondition::TotalLogs(1),
    },
    AchievementDefinition {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Keep a 7-day streak",
        icon: "🔥",
        xp_reward: 150,
        unlock_condition: UnlockCondition::LongestStreak(7),
    },
    AchievementDefinition {
        id: "month_master",
        title: "Month Master",
        description: "Keep a 30-day streak",
        icon: "🗓️",
        xp_reward: 500,
        unlock_condition: UnlockCondition::LongestStreak(30),
    },
    AchievementDefinition {
        id: "perfectionist",
        title: "Perfectionist",
        description: "Log 10 perfect days",
        icon: "💎",
        xp_reward: 300,
        unlock_condition: UnlockCondition::PerfectDays(10),
    },
    AchievementDefinition {
        id: "centurion",
        title: "Centurion",
        description: "Submit 100 daily logs",
        icon: "🏛️",
        xp_reward: 1000,
        unlock_condition: UnlockCondition::TotalLogs(100),
    },
    AchievementDefinition {
        id: "level_10",
        title: "Adept",
        description: "Reach level 10",
        icon: "⭐",
        xp_reward: 200,
        unlock_condition: UnlockCondition::Level(10),
    },
    AchievementDefinition {
        id: "level_25",
        title: "Veteran",
        description: "Reach level 25",
        icon: "🌟",
        xp_reward: 500,
        unlock_condition: UnlockCondition::Level(25),
    },
    AchievementDefinition {
        id: "level_50",
        title: "Legend",
        description: "Reach level 50",
        icon: "👑",
        xp_reward: 2000,
        unlock_condition: UnlockCondition::Level(50),
    },
];
