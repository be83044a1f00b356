//! DomainError → HTTP response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use grindstone::DomainError;

use crate::models::ErrorResponse;

/// Handler error. Wraps a `DomainError` and renders `{kind, message}`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
        DomainError::StackLimitReached { .. }
        | DomainError::AlreadyActive(_)
        | DomainError::CapacityReached { .. } => StatusCode::CONFLICT,
        DomainError::Expired(_) => StatusCode::GONE,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::ExternalService(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_internal() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            kind: self.0.kind().to_string(),
            message: self.0.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
