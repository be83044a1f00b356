//! PostgreSQL implementation of BossRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use grindstone::{
    BossEncounter, BossRepository, BossTemplate, DomainError, Rarity, SpawnCondition,
};

use super::{parse_column, PgLedgerTx};

#[derive(sqlx::FromRow)]
struct BossTemplateRow {
    id: Uuid,
    name: String,
    max_health: i32,
    daily_penalty_xp: i64,
    reward_xp: i64,
    reward_item_rarity: Option<String>,
    spawn_missed_days: i32,
}

impl TryFrom<BossTemplateRow> for BossTemplate {
    type Error = DomainError;

    fn try_from(row: BossTemplateRow) -> Result<Self, Self::Error> {
        let reward_item_rarity = row
            .reward_item_rarity
            .as_deref()
            .map(|r| parse_column::<Rarity>("reward_item_rarity", r))
            .transpose()?;

        Ok(Self {
            id: row.id,
            name: row.name,
            max_health: row.max_health,
            daily_penalty_xp: row.daily_penalty_xp,
            reward_xp: row.reward_xp,
            reward_item_rarity,
            spawn_condition: SpawnCondition::MissedDays(i64::from(row.spawn_missed_days)),
        })
    }
}

#[derive(sqlx::FromRow)]
struct EncounterRow {
    id: Uuid,
    user_id: Uuid,
    template_id: Uuid,
    boss_name: String,
    max_health: i32,
    current_health: i32,
    spawned_at: DateTime<Utc>,
    defeated_at: Option<DateTime<Utc>>,
}

impl From<EncounterRow> for BossEncounter {
    fn from(row: EncounterRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            template_id: row.template_id,
            boss_name: row.boss_name,
            max_health: row.max_health,
            current_health: row.current_health,
            spawned_at: row.spawned_at,
            defeated_at: row.defeated_at,
        }
    }
}

const TEMPLATE_COLUMNS: &str = "id, name, max_health, daily_penalty_xp, reward_xp, \
                                reward_item_rarity, spawn_missed_days";

#[async_trait]
impl BossRepository for PgLedgerTx {
    async fn boss_templates(&mut self) -> Result<Vec<BossTemplate>, DomainError> {
        let rows = sqlx::query_as::<_, BossTemplateRow>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM boss_templates ORDER BY created_at, id"
        ))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_boss_template(&mut self, id: Uuid) -> Result<Option<BossTemplate>, DomainError> {
        let row = sqlx::query_as::<_, BossTemplateRow>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM boss_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn lock_active_encounter(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<BossEncounter>, DomainError> {
        let row = sqlx::query_as::<_, EncounterRow>(
            r#"
            SELECT * FROM boss_encounters
            WHERE user_id = $1 AND defeated_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn lock_encounter(
        &mut self,
        user_id: Uuid,
        encounter_id: Uuid,
    ) -> Result<Option<BossEncounter>, DomainError> {
        let row = sqlx::query_as::<_, EncounterRow>(
            "SELECT * FROM boss_encounters WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(encounter_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn insert_encounter(&mut self, encounter: &BossEncounter) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO boss_encounters
                (id, user_id, template_id, boss_name, max_health, current_health,
                 spawned_at, defeated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(encounter.id)
        .bind(encounter.user_id)
        .bind(encounter.template_id)
        .bind(&encounter.boss_name)
        .bind(encounter.max_health)
        .bind(encounter.current_health)
        .bind(encounter.spawned_at)
        .bind(encounter.defeated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn save_encounter(&mut self, encounter: &BossEncounter) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE boss_encounters SET current_health = $2, defeated_at = $3 WHERE id = $1",
        )
        .bind(encounter.id)
        .bind(encounter.current_health)
        .bind(encounter.defeated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn claim_penalty_day(
        &mut self,
        encounter_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO boss_penalty_logs (encounter_id, penalty_date)
            VALUES ($1, $2)
            ON CONFLICT (encounter_id, penalty_date) DO NOTHING
            "#,
        )
        .bind(encounter_id)
        .bind(date)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
