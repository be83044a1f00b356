//! PostgreSQL implementation of QuestRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use grindstone::{DomainError, Quest, QuestRepository, QuestSelector, QuestStatus};

use super::{parse_column, PgLedgerTx};

#[derive(sqlx::FromRow)]
struct QuestRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    metric_id: Uuid,
    target_value: i32,
    current_value: i32,
    xp_reward: i64,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<QuestRow> for Quest {
    type Error = DomainError;

    fn try_from(row: QuestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_column::<QuestStatus>("status", &row.status)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            metric_id: row.metric_id,
            target_value: row.target_value,
            current_value: row.current_value,
            xp_reward: row.xp_reward,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl QuestRepository for PgLedgerTx {
    async fn list_quests(&mut self, user_id: Uuid) -> Result<Vec<Quest>, DomainError> {
        let rows = sqlx::query_as::<_, QuestRow>(
            "SELECT * FROM quests WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_active_quests(&mut self, user_id: Uuid) -> Result<usize, DomainError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quests WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn delete_expired_quests(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "DELETE FROM quests WHERE user_id = $1 AND status = 'active' AND expires_at <= $2",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn insert_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO quests
                (id, user_id, title, description, metric_id, target_value, current_value,
                 xp_reward, status, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(quest.id)
        .bind(quest.user_id)
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(quest.metric_id)
        .bind(quest.target_value)
        .bind(quest.current_value)
        .bind(quest.xp_reward)
        .bind(quest.status.to_string())
        .bind(quest.created_at)
        .bind(quest.expires_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn lock_active_quests_for_metric(
        &mut self,
        user_id: Uuid,
        metric_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Quest>, DomainError> {
        let rows = sqlx::query_as::<_, QuestRow>(
            r#"
            SELECT * FROM quests
            WHERE user_id = $1 AND metric_id = $2 AND status = 'active' AND expires_at > $3
            ORDER BY created_at
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(metric_id)
        .bind(now)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn save_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        sqlx::query("UPDATE quests SET current_value = $2, status = $3 WHERE id = $1")
            .bind(quest.id)
            .bind(quest.current_value)
            .bind(quest.status.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn delete_active_quests(
        &mut self,
        user_id: Uuid,
        selector: QuestSelector,
    ) -> Result<u64, DomainError> {
        let query = match selector {
            QuestSelector::One(id) => sqlx::query(
                "DELETE FROM quests WHERE user_id = $1 AND status = 'active' AND id = $2",
            )
            .bind(user_id)
            .bind(id),
            QuestSelector::All => {
                sqlx::query("DELETE FROM quests WHERE user_id = $1 AND status = 'active'")
                    .bind(user_id)
            }
        };

        let result = query
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
