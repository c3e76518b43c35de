//! Subscription-backed access gate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{AccessChecker, SubscriptionRepository};

/// Grants access while the user's active subscription has not ended.
pub struct SubscriptionAccessChecker {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionAccessChecker {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }
}

#[async_trait]
impl AccessChecker for SubscriptionAccessChecker {
    async fn has_active_subscription(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let now = Timestamp::now();
        Ok(self
            .subscriptions
            .find_active_by_user(user_id)
            .await?
            .is_some_and(|s| s.grants_access_at(now)))
    }
}
