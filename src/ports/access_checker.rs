//! Subscription access port for premium-gated operations.
//!
//! The checker is fail-secure: a lookup error denies access. Privileged roles
//! are exempted by callers before they reach the checker.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::SubscriptionError;

#[async_trait]
pub trait AccessChecker: Send + Sync {
    /// True if the user holds an `active`, unexpired subscription.
    async fn has_active_subscription(&self, user_id: &UserId) -> Result<bool, DomainError>;

    /// `Forbidden` unless `has_active_subscription` holds.
    async fn require_active_subscription(&self, user_id: &UserId) -> Result<(), DomainError> {
        match self.has_active_subscription(user_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(SubscriptionError::SubscriptionRequired.into()),
            Err(err) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %err,
                    "subscription lookup failed, denying access"
                );
                Err(SubscriptionError::SubscriptionRequired.into())
            }
        }
    }
}
