//! ItemEffect - What happens when an item is consumed or held

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Item effect tag.
///
/// Unrecognized stored values parse to `Unknown` so that catalog additions
/// never break consumption: the item is used up with no further effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemEffect {
    /// Multiplies focus-session XP while active
    XpBoost,
    /// Protects the next missed day from breaking a streak
    FreezeStreak,
    /// Hides negative metrics in the UI for a day
    #[serde(rename = "hide_negatives_24h")]
    HideNegatives24h,
    /// Asks the caller to regenerate the coach insight
    InstantInsight,
    /// Opens a short edit window on yesterday's log
    EditPastLog,
    /// Passive: raises focus damage by `effect_value` percent per stack
    DamageBoost,
    /// Passive: shaves the ambient boss daily penalty per stack
    PenaltyWard,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ItemEffect {
    /// Buff window installed when the item is consumed
    pub fn buff_duration(&self) -> Option<Duration> {
        match self {
            ItemEffect::XpBoost | ItemEffect::HideNegatives24h => Some(Duration::hours(24)),
            ItemEffect::FreezeStreak => Some(Duration::days(14)),
            ItemEffect::EditPastLog => Some(Duration::hours(1)),
            ItemEffect::InstantInsight
            | ItemEffect::DamageBoost
            | ItemEffect::PenaltyWard
            | ItemEffect::Unknown => None,
        }
    }

    /// At most one unexpired buff of the same item may exist
    pub fn is_unique_buff(&self) -> bool {
        matches!(self, ItemEffect::FreezeStreak)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemEffect::XpBoost => "xp_boost",
            ItemEffect::FreezeStreak => "freeze_streak",
            ItemEffect::HideNegatives24h => "hide_negatives_24h",
            ItemEffect::InstantInsight => "instant_insight",
            ItemEffect::EditPastLog => "edit_past_log",
            ItemEffect::DamageBoost => "damage_boost",
            ItemEffect::PenaltyWard => "penalty_ward",
            ItemEffect::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ItemEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemEffect {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "xp_boost" => ItemEffect::XpBoost,
            "freeze_streak" => ItemEffect::FreezeStreak,
            "hide_negatives_24h" => ItemEffect::HideNegatives24h,
            "instant_insight" => ItemEffect::InstantInsight,
            "edit_past_log" => ItemEffect::EditPastLog,
            "damage_boost" => ItemEffect::DamageBoost,
            "penalty_ward" => ItemEffect::PenaltyWard,
            _ => ItemEffect::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_effect_is_forward_compatible() {
        let effect: ItemEffect = "teleport_home".parse().unwrap();
        assert_eq!(effect, ItemEffect::Unknown);
        assert!(effect.buff_duration().is_none());

        let from_json: ItemEffect = serde_json::from_str("\"teleport_home\"").unwrap();
        assert_eq!(from_json, ItemEffect::Unknown);
    }

    #[test]
    fn test_buff_windows() {
        assert_eq!(
            ItemEffect::FreezeStreak.buff_duration(),
            Some(Duration::days(14))
        );
        assert_eq!(
            ItemEffect::EditPastLog.buff_duration(),
            Some(Duration::hours(1))
        );
        assert_eq!(
            "hide_negatives_24h".parse::<ItemEffect>().unwrap(),
            ItemEffect::HideNegatives24h
        );
    }
}
