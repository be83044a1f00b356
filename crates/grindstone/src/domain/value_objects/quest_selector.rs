//! QuestStatus and QuestSelector

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quest lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    Active,
    Completed,
}

impl std::fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestStatus::Active => write!(f, "active"),
            QuestStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for QuestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(QuestStatus::Active),
            "completed" => Ok(QuestStatus::Completed),
            _ => Err(format!("Unknown quest status: {}", s)),
        }
    }
}

/// Which active quests an abandon request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestSelector {
    One(Uuid),
    All,
}

impl std::str::FromStr for QuestSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(QuestSelector::All);
        }
        s.parse::<Uuid>()
            .map(QuestSelector::One)
            .map_err(|_| format!("Expected a quest id or \"all\", got: {}", s))
    }
}
