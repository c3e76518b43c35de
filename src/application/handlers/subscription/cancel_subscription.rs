//! CancelSubscriptionHandler - member-initiated cancellation.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl CancelSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Cancels the caller's active subscription with end date now.
    pub async fn handle(&self, user_id: &UserId) -> Result<Subscription, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_active_by_user(user_id)
            .await?
            .ok_or(SubscriptionError::NoActiveSubscription(*user_id))?;

        subscription.cancel(Timestamp::now())?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            "subscription cancelled"
        );
        Ok(subscription)
    }
}
