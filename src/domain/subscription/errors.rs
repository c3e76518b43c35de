//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NoActiveSubscription | 404 |
//! | SubscriptionNotFound | 404 |
//! | PlanNotFound | 404 |
//! | SubscriptionRequired | 403 |
//! | VerificationFailed | 400 |
//! | InvalidWebhookSignature | 401 |
//! | ValidationFailed | 400 |
//! | Configuration | 500 |
//! | Gateway | 500 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("No active subscription for user {0}")]
    NoActiveSubscription(UserId),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("An active subscription is required")]
    SubscriptionRequired,

    #[error("Payment verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Payment configuration missing: {0}")]
    Configuration(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn verification_failed(reason: impl Into<String>) -> Self {
        SubscriptionError::VerificationFailed(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NoActiveSubscription(_)
            | SubscriptionError::SubscriptionNotFound(_)
            | SubscriptionError::PlanNotFound(_) => ErrorCode::NotFound,
            SubscriptionError::SubscriptionRequired => ErrorCode::Forbidden,
            SubscriptionError::VerificationFailed(_) => ErrorCode::VerificationFailed,
            SubscriptionError::InvalidWebhookSignature => ErrorCode::Unauthorized,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Configuration(_) => ErrorCode::Configuration,
            SubscriptionError::Gateway(_) => ErrorCode::UpstreamFailure,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::VerificationFailed => SubscriptionError::VerificationFailed(err.message),
            ErrorCode::UpstreamFailure => SubscriptionError::Gateway(err.message),
            ErrorCode::Configuration => SubscriptionError::Configuration(err.message),
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        let message = err.to_string();
        match err {
            SubscriptionError::ValidationFailed { field, .. } => {
                DomainError::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
            }
            other => DomainError::new(other.code(), message),
        }
    }
}
