//! PostgreSQL implementation of CampaignRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use grindstone::{CampaignBoss, CampaignProgress, CampaignRepository, DomainError, Rarity};

use super::{parse_column, PgLedgerTx};

#[derive(sqlx::FromRow)]
struct ProgressRow {
    user_id: Uuid,
    current_stage: i32,
    current_boss_health: Option<i32>,
    updated_at: DateTime<Utc>,
}

impl From<ProgressRow> for CampaignProgress {
    fn from(row: ProgressRow) -> Self {
        Self {
            user_id: row.user_id,
            current_stage: row.current_stage,
            current_boss_health: row.current_boss_health,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CampaignBossRow {
    stage: i32,
    name: String,
    max_health: i32,
    reward_xp: i64,
    reward_gold: i64,
    reward_item_rarity: Option<String>,
}

impl TryFrom<CampaignBossRow> for CampaignBoss {
    type Error = DomainError;

    fn try_from(row: CampaignBossRow) -> Result<Self, Self::Error> {
        Ok(Self {
            stage: row.stage,
            name: row.name,
            max_health: row.max_health,
            reward_xp: row.reward_xp,
            reward_gold: row.reward_gold,
            reward_item_rarity: row
                .reward_item_rarity
                .as_deref()
                .map(|r| parse_column::<Rarity>("reward_item_rarity", r))
                .transpose()?,
        })
    }
}

#[async_trait]
impl CampaignRepository for PgLedgerTx {
    async fn lock_campaign_progress(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<CampaignProgress>, DomainError> {
        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT * FROM campaign_progress WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn create_campaign_progress(
        &mut self,
        progress: &CampaignProgress,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_progress (user_id, current_stage, current_boss_health, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(progress.user_id)
        .bind(progress.current_stage)
        .bind(progress.current_boss_health)
        .bind(progress.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn save_campaign_progress(
        &mut self,
        progress: &CampaignProgress,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_progress (user_id, current_stage, current_boss_health, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                current_stage = EXCLUDED.current_stage,
                current_boss_health = EXCLUDED.current_boss_health,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(progress.user_id)
        .bind(progress.current_stage)
        .bind(progress.current_boss_health)
        .bind(progress.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn campaign_boss(&mut self, stage: i32) -> Result<Option<CampaignBoss>, DomainError> {
        let row = sqlx::query_as::<_, CampaignBossRow>(
            r#"
            SELECT stage, name, max_health, reward_xp, reward_gold, reward_item_rarity
            FROM campaign_bosses
            WHERE stage = $1
            "#,
        )
        .bind(stage)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }
}
