//! Shop Repository Port
//!
//! Item catalog, inventory counters, passive stacks, buffs and smuggler events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, ActiveBuff, InventoryEntry, Item, PassiveStack, Rarity, SmugglerEvent,
};

#[async_trait]
pub trait ShopRepository: Send {
    // --- Catalog ---

    async fn list_items(&mut self) -> Result<Vec<Item>, DomainError>;

    async fn find_item(&mut self, item_id: Uuid) -> Result<Option<Item>, DomainError>;

    async fn items_by_rarity(&mut self, rarity: Rarity) -> Result<Vec<Item>, DomainError>;

    // --- Inventory ---

    async fn inventory(&mut self, user_id: Uuid) -> Result<Vec<InventoryEntry>, DomainError>;

    async fn inventory_quantity(&mut self, user_id: Uuid, item_id: Uuid)
        -> Result<i32, DomainError>;

    /// Insert-or-increment. Returns the new quantity.
    async fn add_inventory(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<i32, DomainError>;

    /// Decrement by one where quantity > 0. Returns the new quantity.
    async fn take_inventory(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<i32>, DomainError>;

    // --- Passive stacks ---

    async fn passive_stacks(&mut self, user_id: Uuid) -> Result<Vec<PassiveStack>, DomainError>;

    async fn passive_stack_count(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<i32, DomainError>;

    /// Insert-or-increment where stacks < max. Returns the new stack count.
    async fn increment_passive_stack(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        max_stacks: i32,
    ) -> Result<Option<i32>, DomainError>;

    // --- Buffs ---

    async fn active_buffs(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveBuff>, DomainError>;

    async fn insert_buff(&mut self, buff: &ActiveBuff) -> Result<(), DomainError>;

    /// Insert unless an unexpired buff from the same item exists.
    /// Returns false when the guard rejected the insert.
    async fn insert_buff_if_none_active(
        &mut self,
        buff: &ActiveBuff,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Idempotent: deleting an already-deleted buff is fine
    async fn delete_expired_buffs(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    // --- Smuggler ---

    async fn active_smuggler_event(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SmugglerEvent>, DomainError>;

    async fn find_smuggler_event(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<SmugglerEvent>, DomainError>;

    async fn insert_smuggler_event(&mut self, event: &SmugglerEvent) -> Result<(), DomainError>;
}
