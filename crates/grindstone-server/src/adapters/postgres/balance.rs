//! PostgreSQL implementation of BalanceRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use grindstone::{BalanceRepository, DomainError, UserBalance, XpTransaction};

use super::PgLedgerTx;

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct BalanceRow {
    user_id: Uuid,
    experience: i64,
    level: i32,
    gold: i64,
    titles: Vec<String>,
    active_title: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<BalanceRow> for UserBalance {
    fn from(row: BalanceRow) -> Self {
        Self {
            user_id: row.user_id,
            experience: row.experience,
            level: row.level,
            gold: row.gold,
            titles: row.titles,
            active_title: row.active_title,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl BalanceRepository for PgLedgerTx {
    async fn find_balance(&mut self, user_id: Uuid) -> Result<Option<UserBalance>, DomainError> {
        let row = sqlx::query_as::<_, BalanceRow>("SELECT * FROM user_balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn lock_balance(&mut self, user_id: Uuid) -> Result<Option<UserBalance>, DomainError> {
        let row = sqlx::query_as::<_, BalanceRow>(
            "SELECT * FROM user_balances WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn save_balance(&mut self, balance: &UserBalance) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE user_balances
            SET experience = $2, level = $3, titles = $4, active_title = $5, updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(balance.user_id)
        .bind(balance.experience)
        .bind(balance.level)
        .bind(&balance.titles)
        .bind(&balance.active_title)
        .bind(balance.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn insert_xp_transaction(&mut self, entry: &XpTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO xp_transactions (id, user_id, delta, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.delta)
        .bind(entry.reason.to_string())
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn credit_gold(
        &mut self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE user_balances
            SET gold = gold + $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING gold
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn debit_gold(&mut self, user_id: Uuid, amount: i64) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE user_balances
            SET gold = gold - $2, updated_at = NOW()
            WHERE user_id = $1 AND gold >= $2
            RETURNING gold
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }
}
