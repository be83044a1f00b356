//! PostgreSQL implementation of ShopRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use grindstone::{
    ActiveBuff, DomainError, InventoryEntry, Item, ItemCategory, ItemEffect, PassiveStack,
    Rarity, ShopRepository, SmugglerEvent, SmugglerOffer,
};

use super::{parse_column, PgLedgerTx};

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    rarity: String,
    category: String,
    effect: String,
    effect_value: i32,
    price: i64,
    is_purchasable: bool,
    is_smuggler_exclusive: bool,
    max_stacks: i32,
}

impl TryFrom<ItemRow> for Item {
    type Error = DomainError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        // Unknown effects stay loadable and are consumed without an effect
        let effect = row
            .effect
            .parse::<ItemEffect>()
            .unwrap_or(ItemEffect::Unknown);

        Ok(Self {
            id: row.id,
            name: row.name,
            rarity: parse_column::<Rarity>("rarity", &row.rarity)?,
            category: parse_column::<ItemCategory>("category", &row.category)?,
            effect,
            effect_value: row.effect_value,
            price: row.price,
            is_purchasable: row.is_purchasable,
            is_smuggler_exclusive: row.is_smuggler_exclusive,
            max_stacks: row.max_stacks,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BuffRow {
    id: Uuid,
    user_id: Uuid,
    item_id: Uuid,
    effect: String,
    effect_value: i32,
    expires_at: DateTime<Utc>,
}

impl From<BuffRow> for ActiveBuff {
    fn from(row: BuffRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            item_id: row.item_id,
            effect: row.effect.parse().unwrap_or(ItemEffect::Unknown),
            effect_value: row.effect_value,
            expires_at: row.expires_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SmugglerRow {
    id: Uuid,
    user_id: Uuid,
    item_a: Uuid,
    price_a: i64,
    item_b: Uuid,
    price_b: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SmugglerRow> for SmugglerEvent {
    fn from(row: SmugglerRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            offers: [
                SmugglerOffer {
                    item_id: row.item_a,
                    price: row.price_a,
                },
                SmugglerOffer {
                    item_id: row.item_b,
                    price: row.price_b,
                },
            ],
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

const ITEM_COLUMNS: &str = "id, name, rarity, category, effect, effect_value, price, \
                            is_purchasable, is_smuggler_exclusive, max_stacks";

#[async_trait]
impl ShopRepository for PgLedgerTx {
    async fn list_items(&mut self) -> Result<Vec<Item>, DomainError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at, id"
        ))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_item(&mut self, item_id: Uuid) -> Result<Option<Item>, DomainError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn items_by_rarity(&mut self, rarity: Rarity) -> Result<Vec<Item>, DomainError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE rarity = $1 ORDER BY created_at, id"
        ))
        .bind(rarity.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn inventory(&mut self, user_id: Uuid) -> Result<Vec<InventoryEntry>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, i32)>(
            r#"
            SELECT inv.item_id, inv.quantity
            FROM user_inventory inv
            JOIN items i ON i.id = inv.item_id
            WHERE inv.user_id = $1
            ORDER BY i.created_at, i.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(item_id, quantity)| InventoryEntry {
                user_id,
                item_id,
                quantity,
            })
            .collect())
    }

    async fn inventory_quantity(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<i32, DomainError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM user_inventory WHERE user_id = $1 AND item_id = $2",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(quantity.unwrap_or(0))
    }

    async fn add_inventory(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<i32, DomainError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO user_inventory (user_id, item_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, item_id)
            DO UPDATE SET quantity = user_inventory.quantity + EXCLUDED.quantity
            RETURNING quantity
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn take_inventory(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<i32>, DomainError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE user_inventory
            SET quantity = quantity - 1
            WHERE user_id = $1 AND item_id = $2 AND quantity > 0
            RETURNING quantity
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn passive_stacks(&mut self, user_id: Uuid) -> Result<Vec<PassiveStack>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, i32)>(
            r#"
            SELECT p.item_id, p.stacks
            FROM user_passives p
            JOIN items i ON i.id = p.item_id
            WHERE p.user_id = $1
            ORDER BY i.created_at, i.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(item_id, stacks)| PassiveStack {
                user_id,
                item_id,
                stacks,
            })
            .collect())
    }

    async fn passive_stack_count(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<i32, DomainError> {
        let stacks = sqlx::query_scalar::<_, i32>(
            "SELECT stacks FROM user_passives WHERE user_id = $1 AND item_id = $2",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(stacks.unwrap_or(0))
    }

    async fn increment_passive_stack(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        max_stacks: i32,
    ) -> Result<Option<i32>, DomainError> {
        if max_stacks < 1 {
            return Ok(None);
        }
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO user_passives (user_id, item_id, stacks)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, item_id)
            DO UPDATE SET stacks = user_passives.stacks + 1
            WHERE user_passives.stacks < $3
            RETURNING stacks
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(max_stacks)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn active_buffs(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveBuff>, DomainError> {
        let rows = sqlx::query_as::<_, BuffRow>(
            r#"
            SELECT id, user_id, item_id, effect, effect_value, expires_at
            FROM active_buffs
            WHERE user_id = $1 AND expires_at > $2
            ORDER BY expires_at
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_buff(&mut self, buff: &ActiveBuff) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO active_buffs (id, user_id, item_id, effect, effect_value, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(buff.id)
        .bind(buff.user_id)
        .bind(buff.item_id)
        .bind(buff.effect.as_str())
        .bind(buff.effect_value)
        .bind(buff.expires_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn insert_buff_if_none_active(
        &mut self,
        buff: &ActiveBuff,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO active_buffs (id, user_id, item_id, effect, effect_value, expires_at)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (
                SELECT 1 FROM active_buffs
                WHERE user_id = $2 AND item_id = $3 AND expires_at > $7
            )
            "#,
        )
        .bind(buff.id)
        .bind(buff.user_id)
        .bind(buff.item_id)
        .bind(buff.effect.as_str())
        .bind(buff.effect_value)
        .bind(buff.expires_at)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_buffs(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM active_buffs WHERE user_id = $1 AND expires_at <= $2")
            .bind(user_id)
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn active_smuggler_event(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SmugglerEvent>, DomainError> {
        let row = sqlx::query_as::<_, SmugglerRow>(
            r#"
            SELECT * FROM smuggler_events
            WHERE user_id = $1 AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn find_smuggler_event(
        &mut self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<SmugglerEvent>, DomainError> {
        let row = sqlx::query_as::<_, SmugglerRow>(
            "SELECT * FROM smuggler_events WHERE id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn insert_smuggler_event(&mut self, event: &SmugglerEvent) -> Result<(), DomainError> {
        let [a, b] = &event.offers;
        sqlx::query(
            r#"
            INSERT INTO smuggler_events
                (id, user_id, item_a, price_a, item_b, price_b, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(a.item_id)
        .bind(a.price)
        .bind(b.item_id)
        .bind(b.price)
        .bind(event.created_at)
        .bind(event.expires_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}
