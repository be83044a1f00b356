//! Shop/Inventory Application Service
//!
//! Purchases, consumption, boss loot and the smuggler. Every write is a
//! guarded conditional update inside one transaction: a purchase that
//! fails at any step leaves gold, inventory and stacks untouched.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use grindstone::domain::{
    discounted_price, SMUGGLER_DISCOUNT_MAX_PERCENT, SMUGGLER_DISCOUNT_MIN_PERCENT,
};
use grindstone::{
    ActiveBuff, BalanceRepository, DomainError, Item, ItemEffect, LedgerStore,
    LedgerTx, RandomSource, Rarity, ShopRepository, SmugglerEvent, SmugglerOffer,
};

use super::currency_service::debit_gold_in;
use super::EngineContext;

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub item: Item,
    pub price_paid: i64,
    pub gold_balance: i64,
    /// Inventory quantity after the purchase, for consumables
    pub quantity: Option<i32>,
    /// Stack count after the purchase, for gear and cosmetics
    pub stacks: Option<i32>,
    pub smuggler_event_id: Option<Uuid>,
}

/// Work the caller must carry out after a consume
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FollowUp {
    RegenerateInsight,
    OpenLogEditor { date: NaiveDate },
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsumeOutcome {
    pub item: Item,
    pub remaining_quantity: i32,
    pub buff: Option<ActiveBuff>,
    pub follow_up: Option<FollowUp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeldItem {
    pub item: Item,
    pub count: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub consumables: Vec<HeldItem>,
    pub passives: Vec<HeldItem>,
    pub buffs: Vec<ActiveBuff>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmugglerSlot {
    pub item: Item,
    pub catalog_price: i64,
    pub offer_price: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmugglerOfferView {
    pub event_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub slots: Vec<SmugglerSlot>,
}

/// Draw one item uniformly from the catalog entries of `rarity`
pub(crate) async fn roll_loot(
    tx: &mut dyn LedgerTx,
    random: &dyn RandomSource,
    rarity: Option<Rarity>,
) -> Result<Option<Item>, DomainError> {
    let Some(rarity) = rarity else {
        return Ok(None);
    };
    let mut pool = tx.items_by_rarity(rarity).await?;
    if pool.is_empty() {
        tracing::debug!("No {} items to drop", rarity);
        return Ok(None);
    }
    let index = random.pick_index(pool.len());
    Ok(Some(pool.swap_remove(index)))
}

/// Put a dropped item in the user's hands. Gear already at its cap is skipped.
pub(crate) async fn grant_item(
    tx: &mut dyn LedgerTx,
    user_id: Uuid,
    item: Item,
) -> Result<Option<Item>, DomainError> {
    if item.category.is_stackable_passive() {
        let granted = tx
            .increment_passive_stack(user_id, item.id, item.max_stacks)
            .await?;
        if granted.is_none() {
            tracing::info!(
                "{} already holds {} at max stacks, drop skipped",
                user_id,
                item.name
            );
            return Ok(None);
        }
    } else {
        tx.add_inventory(user_id, item.id, 1).await?;
    }
    Ok(Some(item))
}

pub struct ShopService<S: LedgerStore> {
    ctx: Arc<EngineContext<S>>,
}

impl<S: LedgerStore> ShopService<S> {
    pub fn new(ctx: Arc<EngineContext<S>>) -> Self {
        Self { ctx }
    }

    /// Buy an item at catalog price, or at a smuggler price when an event id is given
    pub async fn purchase(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        smuggler_event_id: Option<Uuid>,
    ) -> Result<PurchaseReceipt, DomainError> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;

        let item = tx
            .find_item(item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", item_id))?;

        let price = match smuggler_event_id {
            Some(event_id) => {
                let event = tx
                    .find_smuggler_event(user_id, event_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("SmugglerEvent", event_id))?;
                let price = event
                    .price_for(item_id)
                    .ok_or_else(|| DomainError::not_found("SmugglerOffer", item_id))?;
                if event.is_expired(now) {
                    return Err(DomainError::Expired(format!(
                        "smuggler offer {event_id} closed at {}",
                        event.expires_at
                    )));
                }
                price
            }
            None => {
                if !item.is_purchasable {
                    return Err(DomainError::Forbidden(format!(
                        "{} is not sold in the shop",
                        item.name
                    )));
                }
                item.price
            }
        };

        let stackable = item.category.is_stackable_passive();
        if stackable && tx.passive_stack_count(user_id, item_id).await? >= item.max_stacks {
            return Err(DomainError::StackLimitReached {
                item: item.name.clone(),
                max: item.max_stacks,
            });
        }

        let gold_balance = debit_gold_in(tx.as_mut(), user_id, price).await?;

        let (quantity, stacks) = if stackable {
            let stacks = tx
                .increment_passive_stack(user_id, item_id, item.max_stacks)
                .await?
                .ok_or_else(|| DomainError::StackLimitReached {
                    item: item.name.clone(),
                    max: item.max_stacks,
                })?;
            (None, Some(stacks))
        } else {
            (Some(tx.add_inventory(user_id, item_id, 1).await?), None)
        };

        tx.commit().await?;

        tracing::info!(
            "🛒 {} bought {} for {} gold{}",
            user_id,
            item.name,
            price,
            if smuggler_event_id.is_some() {
                " (smuggler)"
            } else {
                ""
            }
        );

        Ok(PurchaseReceipt {
            item,
            price_paid: price,
            gold_balance,
            quantity,
            stacks,
            smuggler_event_id,
        })
    }

    /// Use one unit of a held consumable and apply its effect
    pub async fn consume(&self, user_id: Uuid, item_id: Uuid) -> Result<ConsumeOutcome, DomainError> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;

        // Serializes consumes per user
        tx.lock_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        let item = tx
            .find_item(item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", item_id))?;

        if tx.inventory_quantity(user_id, item_id).await? <= 0 {
            return Err(DomainError::Forbidden(format!("no {} left to use", item.name)));
        }

        let remaining_quantity = tx
            .take_inventory(user_id, item_id)
            .await?
            .ok_or_else(|| DomainError::Forbidden(format!("no {} left to use", item.name)))?;

        let buff = match item.effect.buff_duration() {
            Some(duration) => {
                let buff = ActiveBuff {
                    id: Uuid::new_v4(),
                    user_id,
                    item_id,
                    effect: item.effect,
                    effect_value: item.effect_value,
                    expires_at: now + duration,
                };
                if item.effect.is_unique_buff() {
                    // Dropping tx on this error also restores the item
                    if !tx.insert_buff_if_none_active(&buff, now).await? {
                        return Err(DomainError::AlreadyActive(format!(
                            "{} is already running",
                            item.name
                        )));
                    }
                } else {
                    tx.insert_buff(&buff).await?;
                }
                Some(buff)
            }
            None => None,
        };

        let follow_up = match item.effect {
            ItemEffect::InstantInsight => Some(FollowUp::RegenerateInsight),
            ItemEffect::EditPastLog => Some(FollowUp::OpenLogEditor {
                date: self.ctx.clock.today() - Duration::days(1),
            }),
            _ => None,
        };

        tx.commit().await?;

        tracing::info!("🧪 {} used {} ({})", user_id, item.name, item.effect);

        Ok(ConsumeOutcome {
            item,
            remaining_quantity,
            buff,
            follow_up,
        })
    }

    /// The live smuggler offer, or a fresh one if the dice allow
    pub async fn get_or_spawn_smuggler_offer(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SmugglerOfferView>, DomainError> {
        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;

        // Serializes spawning per user
        tx.lock_balance(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if let Some(event) = tx.active_smuggler_event(user_id, now).await? {
            let view = self.view_of(tx.as_mut(), &event).await?;
            tx.commit().await?;
            return Ok(Some(view));
        }

        if !self.ctx.random.chance(self.ctx.config.smuggler_spawn_chance) {
            tx.commit().await?;
            return Ok(None);
        }

        let pool: Vec<Item> = tx
            .list_items()
            .await?
            .into_iter()
            .filter(Item::in_smuggler_pool)
            .collect();
        let Some((first, second)) = self.ctx.random.pick_two_distinct(pool.len()) else {
            tx.commit().await?;
            return Ok(None);
        };

        let offer_for = |item: &Item| SmugglerOffer {
            item_id: item.id,
            price: discounted_price(
                item.price,
                self.ctx
                    .random
                    .range_inclusive(SMUGGLER_DISCOUNT_MIN_PERCENT, SMUGGLER_DISCOUNT_MAX_PERCENT),
            ),
        };
        let event = SmugglerEvent {
            id: Uuid::new_v4(),
            user_id,
            offers: [offer_for(&pool[first]), offer_for(&pool[second])],
            created_at: now,
            expires_at: now + self.ctx.config.smuggler_offer_window(),
        };
        tx.insert_smuggler_event(&event).await?;

        let view = SmugglerOfferView {
            event_id: event.id,
            expires_at: event.expires_at,
            slots: [&pool[first], &pool[second]]
                .into_iter()
                .zip(event.offers.iter())
                .map(|(item, offer)| SmugglerSlot {
                    item: item.clone(),
                    catalog_price: item.price,
                    offer_price: offer.price,
                })
                .collect(),
        };
        tx.commit().await?;

        tracing::info!(
            "🕵️ Smuggler appeared for {} until {}",
            user_id,
            event.expires_at
        );
        Ok(Some(view))
    }

    async fn view_of(
        &self,
        tx: &mut dyn LedgerTx,
        event: &SmugglerEvent,
    ) -> Result<SmugglerOfferView, DomainError> {
        let mut slots = Vec::with_capacity(event.offers.len());
        for offer in &event.offers {
            let item = tx
                .find_item(offer.item_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Item", offer.item_id))?;
            slots.push(SmugglerSlot {
                catalog_price: item.price,
                offer_price: offer.price,
                item,
            });
        }
        Ok(SmugglerOfferView {
            event_id: event.id,
            expires_at: event.expires_at,
            slots,
        })
    }

    /// Items sold in the regular shop
    pub async fn list_shop_items(&self) -> Result<Vec<Item>, DomainError> {
        let mut tx = self.ctx.begin().await?;
        let items = tx.list_items().await?;
        tx.commit().await?;
        Ok(items.into_iter().filter(|i| i.is_purchasable).collect())
    }

    pub async fn get_inventory(&self, user_id: Uuid) -> Result<InventoryView, DomainError> {
        self.ctx.sweep_expired_buffs(user_id).await;

        let now = self.ctx.now();
        let mut tx = self.ctx.begin().await?;

        let mut consumables = Vec::new();
        for entry in tx.inventory(user_id).await? {
            if entry.quantity <= 0 {
                continue;
            }
            if let Some(item) = tx.find_item(entry.item_id).await? {
                consumables.push(HeldItem {
                    item,
                    count: entry.quantity,
                });
            }
        }

        let mut passives = Vec::new();
        for stack in tx.passive_stacks(user_id).await? {
            if let Some(item) = tx.find_item(stack.item_id).await? {
                passives.push(HeldItem {
                    item,
                    count: stack.stacks,
                });
            }
        }

        let buffs = tx.active_buffs(user_id, now).await?;
        tx.commit().await?;

        Ok(InventoryView {
            consumables,
            passives,
            buffs,
        })
    }
}
