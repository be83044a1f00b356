//! XpReason - Audit key attached to every experience change

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why experience moved. Rendered into the transaction log as `<tag>:<detail>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum XpReason {
    DailyLog { date: NaiveDate },
    FocusSession { at: DateTime<Utc> },
    BossDefeated { name: String },
    CampaignBossDefeated { stage: i32 },
    QuestCompleted { quest_id: Uuid },
    BossPenalty { date: NaiveDate },
    /// Free-form key supplied by the request layer
    Manual { key: String },
}

impl std::fmt::Display for XpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XpReason::DailyLog { date } => write!(f, "daily_log:{date}"),
            XpReason::FocusSession { at } => write!(f, "focus_session:{}", at.to_rfc3339()),
            XpReason::BossDefeated { name } => write!(f, "boss_defeated:{name}"),
            XpReason::CampaignBossDefeated { stage } => {
                write!(f, "campaign_boss_defeated:{stage}")
            }
            XpReason::QuestCompleted { quest_id } => write!(f, "quest_completed:{quest_id}"),
            XpReason::BossPenalty { date } => write!(f, "boss_penalty:{date}"),
            XpReason::Manual { key } => write!(f, "{key}"),
        }
    }
}

impl std::str::FromStr for XpReason {
    type Err = String;

    /// Parses an audit key back into its tag. Keys without a known tag are `Manual`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("XP reason must not be empty".to_string());
        }

        let manual = || XpReason::Manual { key: s.to_string() };
        let Some((tag, detail)) = s.split_once(':') else {
            return Ok(manual());
        };

        let parsed = match tag {
            "daily_log" => detail.parse().ok().map(|date| XpReason::DailyLog { date }),
            "focus_session" => DateTime::parse_from_rfc3339(detail)
                .ok()
                .map(|at| XpReason::FocusSession {
                    at: at.with_timezone(&Utc),
                }),
            "boss_defeated" => Some(XpReason::BossDefeated {
                name: detail.to_string(),
            }),
            "campaign_boss_defeated" => detail
                .parse()
                .ok()
                .map(|stage| XpReason::CampaignBossDefeated { stage }),
            "quest_completed" => detail
                .parse()
                .ok()
                .map(|quest_id| XpReason::QuestCompleted { quest_id }),
            "boss_penalty" => detail.parse().ok().map(|date| XpReason::BossPenalty { date }),
            _ => None,
        };

        Ok(parsed.unwrap_or_else(manual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_keys() {
        let reason = XpReason::BossDefeated {
            name: "Sloth Wyrm".to_string(),
        };
        assert_eq!(reason.to_string(), "boss_defeated:Sloth Wyrm");

        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            XpReason::BossPenalty { date }.to_string(),
            "boss_penalty:2026-03-01"
        );
    }

    #[test]
    fn test_parse_known_and_manual() {
        let parsed: XpReason = "campaign_boss_defeated:4".parse().unwrap();
        assert_eq!(parsed, XpReason::CampaignBossDefeated { stage: 4 });

        let parsed: XpReason = "daily_log".parse().unwrap();
        assert_eq!(
            parsed,
            XpReason::Manual {
                key: "daily_log".to_string()
            }
        );

        // Malformed detail falls back to the raw key
        let parsed: XpReason = "quest_completed:not-a-uuid".parse().unwrap();
        assert!(matches!(parsed, XpReason::Manual { .. }));

        assert!("  ".parse::<XpReason>().is_err());
    }
}
