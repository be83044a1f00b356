//! Shop - Catalog, inventory and the smuggler

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use grindstone::Item;

use super::BuffResponse;
use crate::application::{
    ConsumeOutcome, FollowUp, HeldItem, InventoryView, PurchaseReceipt, SmugglerOfferView,
    SmugglerSlot,
};

// ============================================
// Request DTOs
// ============================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    pub item_id: Uuid,
    /// Buy at the discounted price of this smuggler offer
    pub smuggler_event_id: Option<Uuid>,
}

// ============================================
// Response DTOs
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub rarity: String,
    pub category: String,
    pub effect: String,
    pub effect_value: i32,
    pub price: i64,
    pub is_purchasable: bool,
    pub is_smuggler_exclusive: bool,
    pub max_stacks: i32,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            rarity: item.rarity.to_string(),
            category: item.category.to_string(),
            effect: item.effect.to_string(),
            effect_value: item.effect_value,
            price: item.price,
            is_purchasable: item.is_purchasable,
            is_smuggler_exclusive: item.is_smuggler_exclusive,
            max_stacks: item.max_stacks,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub item: ItemResponse,
    pub price_paid: i64,
    pub gold_balance: i64,
    pub quantity: Option<i32>,
    pub stacks: Option<i32>,
    pub smuggler_event_id: Option<Uuid>,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            item: receipt.item.into(),
            price_paid: receipt.price_paid,
            gold_balance: receipt.gold_balance,
            quantity: receipt.quantity,
            stacks: receipt.stacks,
            smuggler_event_id: receipt.smuggler_event_id,
        }
    }
}

/// Work left to the client after a consume
#[derive(Debug, Serialize, ToSchema)]
pub struct FollowUpResponse {
    /// `regenerate_insight` or `open_log_editor`
    pub action: String,
    pub date: Option<NaiveDate>,
}

impl From<FollowUp> for FollowUpResponse {
    fn from(follow_up: FollowUp) -> Self {
        match follow_up {
            FollowUp::RegenerateInsight => Self {
                action: "regenerate_insight".to_string(),
                date: None,
            },
            FollowUp::OpenLogEditor { date } => Self {
                action: "open_log_editor".to_string(),
                date: Some(date),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsumeResponse {
    pub item: ItemResponse,
    pub remaining_quantity: i32,
    pub buff: Option<BuffResponse>,
    pub follow_up: Option<FollowUpResponse>,
}

impl From<ConsumeOutcome> for ConsumeResponse {
    fn from(outcome: ConsumeOutcome) -> Self {
        Self {
            item: outcome.item.into(),
            remaining_quantity: outcome.remaining_quantity,
            buff: outcome.buff.map(Into::into),
            follow_up: outcome.follow_up.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HeldItemResponse {
    pub item: ItemResponse,
    pub count: i32,
}

impl From<HeldItem> for HeldItemResponse {
    fn from(held: HeldItem) -> Self {
        Self {
            item: held.item.into(),
            count: held.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryResponse {
    pub consumables: Vec<HeldItemResponse>,
    pub passives: Vec<HeldItemResponse>,
    pub buffs: Vec<BuffResponse>,
}

impl From<InventoryView> for InventoryResponse {
    fn from(view: InventoryView) -> Self {
        Self {
            consumables: view.consumables.into_iter().map(Into::into).collect(),
            passives: view.passives.into_iter().map(Into::into).collect(),
            buffs: view.buffs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SmugglerSlotResponse {
    pub item: ItemResponse,
    pub catalog_price: i64,
    pub offer_price: i64,
}

impl From<SmugglerSlot> for SmugglerSlotResponse {
    fn from(slot: SmugglerSlot) -> Self {
        Self {
            item: slot.item.into(),
            catalog_price: slot.catalog_price,
            offer_price: slot.offer_price,
        }
    }
}

/// Current smuggler offer; `event_id` is null when none is available
#[derive(Debug, Serialize, ToSchema)]
pub struct SmugglerOfferResponse {
    pub event_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub slots: Vec<SmugglerSlotResponse>,
}

impl From<Option<SmugglerOfferView>> for SmugglerOfferResponse {
    fn from(view: Option<SmugglerOfferView>) -> Self {
        match view {
            Some(view) => Self {
                event_id: Some(view.event_id),
                expires_at: Some(view.expires_at),
                slots: view.slots.into_iter().map(Into::into).collect(),
            },
            None => Self {
                event_id: None,
                expires_at: None,
                slots: Vec::new(),
            },
        }
    }
}
