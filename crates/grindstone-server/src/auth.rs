//! Request authentication
//!
//! - Internal routes carry `Authorization: Bearer <GRINDSTONE_API_KEY>`.
//!   Without a configured key the check is disabled.
//! - User routes resolve the caller through `CurrentUser`, which reads the
//!   `X-User-Id` header set by the upstream auth gateway.

use std::sync::OnceLock;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use grindstone::{DomainError, IdentityResolver};

use crate::adapters::identity::USER_ID_HEADER;
use crate::adapters::HeaderIdentityResolver;
use crate::routes::error::ApiError;

static API_KEY: OnceLock<String> = OnceLock::new();

/// Set the internal API key once at startup
pub fn init_api_key(key: String) {
    if API_KEY.set(key).is_err() {
        tracing::warn!("API key already initialized, ignoring");
    }
}

fn bearer_matches(header: Option<&str>, expected: &str) -> bool {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token.trim() == expected)
}

/// Rejects internal requests without the configured bearer key
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let Some(expected) = API_KEY.get().filter(|k| !k.is_empty()) else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !bearer_matches(header, expected) {
        tracing::warn!("Rejected internal request to {}", request.uri().path());
        return ApiError(DomainError::Unauthorized).into_response();
    }

    next.run(request).await
}

/// The resolved caller of a user route
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());

        let user_id = HeaderIdentityResolver
            .require_user_id(credential)
            .await
            .map_err(ApiError)?;

        Ok(CurrentUser(user_id))
    }
}
