//! GetSubscriptionStatusHandler - reports the caller's subscription and
//! applies lazy expiry.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusView {
    pub has_subscription: bool,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

pub struct GetSubscriptionStatusHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionStatusHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// An active subscription past its end date is flipped to `cancelled`
    /// and persisted before reporting.
    pub async fn handle(&self, user_id: &UserId) -> Result<SubscriptionStatusView, DomainError> {
        let Some(mut current) = self.subscriptions.find_active_by_user(user_id).await? else {
            return Ok(SubscriptionStatusView {
                has_subscription: false,
                expired: false,
                subscription: None,
            });
        };

        if current.expire_if_due(Timestamp::now()) {
            self.subscriptions.update(&current).await?;
            tracing::info!(
                user_id = %user_id,
                subscription_id = %current.id,
                "subscription expired"
            );
            return Ok(SubscriptionStatusView {
                has_subscription: false,
                expired: true,
                subscription: Some(current),
            });
        }

        Ok(SubscriptionStatusView {
            has_subscription: true,
            expired: false,
            subscription: Some(current),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::domain::foundation::SubscriptionId;
    use crate::domain::subscription::SubscriptionStatus;

    #[tokio::test]
    async fn no_subscription_reports_false() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let view = GetSubscriptionStatusHandler::new(repo)
            .handle(&UserId::new())
            .await
            .unwrap();
        assert!(!view.has_subscription);
        assert!(!view.expired);
    }

    #[tokio::test]
    async fn current_subscription_is_reported() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let user = UserId::new();
        repo.save(&Subscription::create_free(SubscriptionId::new(), user, Timestamp::now()))
            .await
            .unwrap();

        let view = GetSubscriptionStatusHandler::new(repo).handle(&user).await.unwrap();
        assert!(view.has_subscription);
        assert!(view.subscription.is_some());
    }

    #[tokio::test]
    async fn lapsed_subscription_is_flipped_and_persisted() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let user = UserId::new();
        let lapsed =
            Subscription::create_free(SubscriptionId::new(), user, Timestamp::now().add_days(-60));
        repo.save(&lapsed).await.unwrap();

        let view = GetSubscriptionStatusHandler::new(repo.clone())
            .handle(&user)
            .await
            .unwrap();
        assert!(!view.has_subscription);
        assert!(view.expired);

        let stored = repo.find_by_id(&lapsed.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = SubscriptionStatusView {
            has_subscription: false,
            expired: true,
            subscription: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, serde_json::json!({ "hasSubscription": false, "expired": true }));
    }
}
