//! Identity Resolver Port
//!
//! Turns the credential presented by the request layer into a user id.
//! Session handling lives outside the engine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` when no user can be resolved
    async fn current_user_id(&self, credential: Option<&str>) -> Option<Uuid>;

    /// Like `current_user_id` but absence is `Unauthorized`
    async fn require_user_id(&self, credential: Option<&str>) -> Result<Uuid, DomainError> {
        self.current_user_id(credential)
            .await
            .ok_or(DomainError::Unauthorized)
    }
}
