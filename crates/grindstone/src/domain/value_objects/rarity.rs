//! Rarity and ItemCategory - Item classification

use serde::{Deserialize, Serialize};

/// Loot rarity tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rarity::Common => write!(f, "common"),
            Rarity::Uncommon => write!(f, "uncommon"),
            Rarity::Rare => write!(f, "rare"),
            Rarity::Epic => write!(f, "epic"),
            Rarity::Legendary => write!(f, "legendary"),
        }
    }
}

impl std::str::FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            _ => Err(format!("Unknown rarity: {}", s)),
        }
    }
}

/// What kind of thing an item is; decides where ownership is counted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Counted in the inventory, used up by `consume`
    Consumable,
    /// Counted as passive stacks, capped per item
    CombatGear,
    /// Counted as passive stacks, capped per item
    Cosmetic,
}

impl ItemCategory {
    pub fn is_stackable_passive(&self) -> bool {
        matches!(self, ItemCategory::CombatGear | ItemCategory::Cosmetic)
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemCategory::Consumable => write!(f, "consumable"),
            ItemCategory::CombatGear => write!(f, "combat_gear"),
            ItemCategory::Cosmetic => write!(f, "cosmetic"),
        }
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "consumable" => Ok(ItemCategory::Consumable),
            "combat_gear" => Ok(ItemCategory::CombatGear),
            "cosmetic" => Ok(ItemCategory::Cosmetic),
            _ => Err(format!("Unknown item category: {}", s)),
        }
    }
}
