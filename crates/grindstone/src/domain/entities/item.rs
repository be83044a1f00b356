//! Item - Catalog entries and everything a user holds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ItemCategory, ItemEffect, Rarity};

/// Item catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub rarity: Rarity,
    pub category: ItemCategory,
    pub effect: ItemEffect,
    pub effect_value: i32,
    pub price: i64,
    pub is_purchasable: bool,
    /// Only ever offered through the smuggler
    pub is_smuggler_exclusive: bool,
    /// Cap on passive stacks for gear and cosmetics
    pub max_stacks: i32,
}

impl Item {
    /// Create a purchasable item with a single-stack cap
    pub fn new(
        name: impl Into<String>,
        rarity: Rarity,
        category: ItemCategory,
        effect: ItemEffect,
        price: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rarity,
            category,
            effect,
            effect_value: 0,
            price,
            is_purchasable: true,
            is_smuggler_exclusive: false,
            max_stacks: 1,
        }
    }

    pub fn with_effect_value(mut self, value: i32) -> Self {
        self.effect_value = value;
        self
    }

    pub fn with_max_stacks(mut self, max: i32) -> Self {
        self.max_stacks = max.max(1);
        self
    }

    pub fn smuggler_exclusive(mut self) -> Self {
        self.is_purchasable = false;
        self.is_smuggler_exclusive = true;
        self
    }

    pub fn in_smuggler_pool(&self) -> bool {
        self.is_purchasable || self.is_smuggler_exclusive
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassiveStack {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub stacks: i32,
}

/// Timed effect installed by consuming an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveBuff {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub effect: ItemEffect,
    pub effect_value: i32,
    pub expires_at: DateTime<Utc>,
}

impl ActiveBuff {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// One discounted slot of a smuggler event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmugglerOffer {
    pub item_id: Uuid,
    pub price: i64,
}

/// Ephemeral two-item discount offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmugglerEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub offers: [SmugglerOffer; 2],
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SmugglerEvent {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn price_for(&self, item_id: Uuid) -> Option<i64> {
        self.offers
            .iter()
            .find(|offer| offer.item_id == item_id)
            .map(|offer| offer.price)
    }
}
