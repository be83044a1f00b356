//! Header-based identity resolution
//!
//! The upstream auth gateway authenticates the session and forwards the
//! user id in `X-User-Id`. This adapter only parses it.

use async_trait::async_trait;
use uuid::Uuid;

use grindstone::IdentityResolver;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Default)]
pub struct HeaderIdentityResolver;

#[async_trait]
impl IdentityResolver for HeaderIdentityResolver {
    async fn current_user_id(&self, credential: Option<&str>) -> Option<Uuid> {
        let raw = credential?.trim();
        match Uuid::parse_str(raw) {
            Ok(id) if !id.is_nil() => Some(id),
            _ => {
                tracing::debug!("Rejected malformed user id header");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grindstone::DomainError;

    #[tokio::test]
    async fn test_resolves_valid_ids_only() {
        let resolver = HeaderIdentityResolver;
        let id = Uuid::new_v4();

        assert_eq!(
            resolver.current_user_id(Some(&format!(" {id} "))).await,
            Some(id)
        );
        assert_eq!(resolver.current_user_id(Some("not-a-uuid")).await, None);
        assert_eq!(
            resolver.current_user_id(Some(&Uuid::nil().to_string())).await,
            None
        );
        assert!(matches!(
            resolver.require_user_id(None).await,
            Err(DomainError::Unauthorized)
        ));
    }
}
