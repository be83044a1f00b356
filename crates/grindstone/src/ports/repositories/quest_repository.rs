//! Quest Repository Port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{errors::DomainError, Quest, QuestSelector};

#[async_trait]
pub trait QuestRepository: Send {
    /// Active and completed quests, newest first
    async fn list_quests(&mut self, user_id: Uuid) -> Result<Vec<Quest>, DomainError>;

    async fn count_active_quests(&mut self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Remove active quests past their expiry
    async fn delete_expired_quests(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    async fn insert_quest(&mut self, quest: &Quest) -> Result<(), DomainError>;

    /// Active, unexpired quests on a metric, locked
    async fn lock_active_quests_for_metric(
        &mut self,
        user_id: Uuid,
        metric_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Quest>, DomainError>;

    /// Persist progress and status
    async fn save_quest(&mut self, quest: &Quest) -> Result<(), DomainError>;

    /// Delete matching quests that are still active
    async fn delete_active_quests(
        &mut self,
        user_id: Uuid,
        selector: QuestSelector,
    ) -> Result<u64, DomainError>;
}
