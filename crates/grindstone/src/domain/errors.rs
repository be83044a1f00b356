//! Domain Errors
//!
//! Error types for engine operations. Every variant carries a stable
//! machine-readable kind and a message safe to show to the user.

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unauthorized: no resolved user identity")]
    Unauthorized,

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Insufficient funds: {required} gold required, {available} available")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Stack limit reached: {item} is capped at {max}")]
    StackLimitReached { item: String, max: i32 },

    #[error("Already active: {0}")]
    AlreadyActive(String),

    #[error("Capacity reached: at most {limit} active quests")]
    CapacityReached { limit: usize },

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: Uuid) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn not_found_str<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    /// Rejects non-positive amounts before any mutating step
    pub fn require_positive(field: &str, amount: i64) -> Result<(), Self> {
        if amount <= 0 {
            return Err(Self::InvalidInput(format!(
                "{field} must be positive, got {amount}"
            )));
        }
        Ok(())
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Unauthorized => "unauthorized",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::InsufficientFunds { .. } => "insufficient_funds",
            DomainError::StackLimitReached { .. } => "stack_limit_reached",
            DomainError::AlreadyActive(_) => "already_active",
            DomainError::CapacityReached { .. } => "capacity_reached",
            DomainError::Expired(_) => "expired",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::Repository(_) => "internal",
            DomainError::ExternalService(_) => "external_service",
        }
    }

    /// Human-readable message; infrastructure failures never leak their detail
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            return "internal error".to_string();
        }
        self.to_string()
    }

    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::Repository(_) | DomainError::ExternalService(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_detail_is_masked() {
        let err = DomainError::Repository("connection refused on 10.0.0.3:5432".to_string());
        assert_eq!(err.kind(), "internal");
        assert_eq!(err.public_message(), "internal error");
        assert!(err.is_internal());
    }

    #[test]
    fn test_user_errors_keep_message() {
        let err = DomainError::InsufficientFunds {
            required: 200,
            available: 150,
        };
        assert_eq!(err.kind(), "insufficient_funds");
        assert!(err.public_message().contains("200"));
    }

    #[test]
    fn test_require_positive() {
        assert!(DomainError::require_positive("amount", 1).is_ok());
        assert!(matches!(
            DomainError::require_positive("amount", 0),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
