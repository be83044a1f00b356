//! Activity Repository Port
//!
//! Read-only view over daily logs, streaks and tracked metrics, which are
//! written by the log pipeline outside the engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{errors::DomainError, MetricScore, UserStats};

#[async_trait]
pub trait ActivityRepository: Send {
    /// Log counts and streaks. `level` is left at 0 for the caller to fill.
    async fn activity_stats(&mut self, user_id: Uuid) -> Result<UserStats, DomainError>;

    /// Most recent day with a scored log
    async fn last_scored_date(&mut self, user_id: Uuid) -> Result<Option<NaiveDate>, DomainError>;

    /// Summed awarded score per active metric for logs on or after `since`.
    /// Active metrics without logs appear with a zero total.
    async fn metric_scores_since(
        &mut self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<MetricScore>, DomainError>;
}
