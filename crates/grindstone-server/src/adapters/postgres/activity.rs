//! PostgreSQL implementation of ActivityRepository
//!
//! Reads tables owned by the daily-log pipeline. Nothing here writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use grindstone::{ActivityRepository, DomainError, MetricScore, UserStats};

use super::PgLedgerTx;

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_logs: i64,
    longest_streak: i64,
    perfect_days: i64,
}

#[derive(sqlx::FromRow)]
struct MetricScoreRow {
    metric_id: Uuid,
    metric_name: String,
    total_score: i64,
}

impl From<MetricScoreRow> for MetricScore {
    fn from(row: MetricScoreRow) -> Self {
        Self {
            metric_id: row.metric_id,
            metric_name: row.metric_name,
            total_score: row.total_score,
        }
    }
}

#[async_trait]
impl ActivityRepository for PgLedgerTx {
    async fn activity_stats(&mut self, user_id: Uuid) -> Result<UserStats, DomainError> {
        // Savepoint: a failed read must not abort the caller's transaction
        let mut savepoint = sqlx::Connection::begin(&mut *self.tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM daily_logs WHERE user_id = $1) AS total_logs,
                COALESCE(
                    (SELECT longest_streak FROM user_streaks WHERE user_id = $1), 0
                )::BIGINT AS longest_streak,
                (SELECT COUNT(*) FROM daily_logs WHERE user_id = $1 AND is_perfect) AS perfect_days
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *savepoint)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        savepoint
            .commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(UserStats {
            total_logs: row.total_logs,
            longest_streak: row.longest_streak,
            perfect_days: row.perfect_days,
            level: 0,
        })
    }

    async fn last_scored_date(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<NaiveDate>, DomainError> {
        sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MAX(log_date) FROM daily_logs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn metric_scores_since(
        &mut self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<MetricScore>, DomainError> {
        let rows = sqlx::query_as::<_, MetricScoreRow>(
            r#"
            SELECT m.id AS metric_id,
                   m.name AS metric_name,
                   COALESCE(SUM(s.awarded_score), 0)::BIGINT AS total_score
            FROM tracked_metrics m
            LEFT JOIN metric_scores s
                   ON s.metric_id = m.id AND s.user_id = $1 AND s.log_date >= $2
            WHERE m.is_active
            GROUP BY m.id, m.name, m.created_at
            ORDER BY m.created_at, m.id
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
