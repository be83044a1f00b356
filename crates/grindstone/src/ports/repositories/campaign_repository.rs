//! Campaign Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, CampaignBoss, CampaignProgress};

#[async_trait]
pub trait CampaignRepository: Send {
    async fn lock_campaign_progress(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<CampaignProgress>, DomainError>;

    /// Create the user's row if none exists. Never overwrites.
    async fn create_campaign_progress(
        &mut self,
        progress: &CampaignProgress,
    ) -> Result<(), DomainError>;

    /// Insert or update the user's campaign row
    async fn save_campaign_progress(
        &mut self,
        progress: &CampaignProgress,
    ) -> Result<(), DomainError>;

    async fn campaign_boss(&mut self, stage: i32) -> Result<Option<CampaignBoss>, DomainError>;
}
