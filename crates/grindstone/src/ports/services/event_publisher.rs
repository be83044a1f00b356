//! Event Publisher Port
//!
//! Hands engine events to the notification collaborator. Publishing
//! happens after commit and is best-effort: a failed delivery never undoes
//! a committed reward.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, EngineEvent};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &EngineEvent) -> Result<(), DomainError>;

    /// Publish each event, logging failures instead of returning them
    async fn publish_all(&self, events: &[EngineEvent]) {
        for event in events {
            if let Err(e) = self.publish(event).await {
                tracing::warn!(
                    "Failed to publish {} for user {}: {}",
                    event.name(),
                    event.user_id(),
                    e
                );
            }
        }
    }
}
