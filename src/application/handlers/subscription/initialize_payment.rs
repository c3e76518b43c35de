//! InitializePaymentHandler - starts a free or paid subscription.
//!
//! The free tier never touches the gateway. A paid tier creates a hosted
//! checkout and records a `pending` subscription carrying the checkout
//! reference, which `VerifyPaymentHandler` later activates.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{checkout_reference, Subscription, SubscriptionError, Tier};
use crate::ports::{
    CheckoutRequest, PaymentGateway, PlanRepository, SubscriptionRepository, UserRepository,
};

/// Gateway settings the checkout needs from configuration.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSettings {
    /// Where the gateway sends the member after paying. Required for paid
    /// tiers.
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InitializePaymentCommand {
    pub user_id: UserId,
    pub tier: String,
}

#[derive(Debug, Clone)]
pub enum InitializePaymentResult {
    /// Free subscription created or extended.
    Free(Subscription),
    /// Paid checkout created; the member continues at `link`.
    Checkout {
        link: String,
        reference: String,
        subscription: Subscription,
    },
}

pub struct InitializePaymentHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl InitializePaymentHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            users,
            gateway,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitializePaymentCommand,
    ) -> Result<InitializePaymentResult, DomainError> {
        let tier = Tier::parse(&cmd.tier)?;
        let now = Timestamp::now();
        if tier.is_free() {
            return self.start_free(&cmd.user_id, now).await.map(InitializePaymentResult::Free);
        }
        self.start_checkout(&cmd.user_id, &tier, now).await
    }

    async fn start_free(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Subscription, DomainError> {
        match self.subscriptions.find_active_by_user(user_id).await? {
            Some(mut current) if current.tier.is_free() => {
                current.extend_free(now)?;
                self.subscriptions.update(&current).await?;
                tracing::info!(
                    user_id = %user_id,
                    end_date = %current.end_date,
                    "free subscription extended"
                );
                Ok(current)
            }
            Some(current) if current.grants_access_at(now) => Err(DomainError::conflict(
                "A paid subscription is already active",
            )
            .with_detail("subscription_id", current.id.to_string())),
            Some(mut lapsed) => {
                lapsed.expire_if_due(now);
                self.subscriptions.update(&lapsed).await?;
                self.create_free(user_id, now).await
            }
            None => self.create_free(user_id, now).await,
        }
    }

    async fn create_free(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Subscription, DomainError> {
        let subscription = Subscription::create_free(SubscriptionId::new(), *user_id, now);
        self.subscriptions.save(&subscription).await?;
        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            "free subscription created"
        );
        Ok(subscription)
    }

    async fn start_checkout(
        &self,
        user_id: &UserId,
        tier: &Tier,
        now: Timestamp,
    ) -> Result<InitializePaymentResult, DomainError> {
        // 1. Resolve the active plan for the tier
        let plan = self
            .plans
            .find_by_name(tier.as_str())
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| SubscriptionError::PlanNotFound(tier.to_string()))?;

        // 2. Configuration must name a redirect target
        let redirect_url = self
            .settings
            .redirect_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| SubscriptionError::Configuration("payment redirect url".into()))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        // 3. Hosted checkout
        let reference = checkout_reference(user_id, now);
        let link = self
            .gateway
            .create_checkout(CheckoutRequest {
                reference: reference.clone(),
                amount_minor: plan.price_minor,
                currency: plan.currency.clone(),
                redirect_url,
                customer_email: user.email.clone(),
                customer_name: user.name.clone(),
                gateway_plan_id: plan.gateway_plan_id.clone(),
                title: format!("{} membership", plan.name),
                metadata: serde_json::json!({
                    "plan_id": plan.id.to_string(),
                    "user_id": user_id.to_string(),
                    "tier": plan.name,
                }),
            })
            .await?;

        // 4. Record the pending subscription
        let subscription = Subscription::create_pending(
            SubscriptionId::new(),
            *user_id,
            &plan,
            reference.clone(),
            now,
        );
        self.subscriptions.save(&subscription).await?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan.name,
            reference = %reference,
            "checkout initialized"
        );

        Ok(InitializePaymentResult::Checkout {
            link: link.link,
            reference,
            subscription,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::Stores;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::subscription::{BillingInterval, SubscriptionStatus};
    use crate::ports::{GatewayError, PlanRepository};

    fn handler(stores: &Stores, redirect_url: Option<&str>) -> InitializePaymentHandler {
        InitializePaymentHandler::new(
            stores.subscriptions.clone(),
            stores.plans.clone(),
            stores.users.clone(),
            stores.gateway.clone(),
            CheckoutSettings {
                redirect_url: redirect_url.map(String::from),
            },
        )
    }

    fn command(user_id: UserId, tier: &str) -> InitializePaymentCommand {
        InitializePaymentCommand {
            user_id,
            tier: tier.into(),
        }
    }

    #[tokio::test]
    async fn free_tier_creates_active_month_without_gateway() {
        let stores = Stores::new();
        let user = UserId::new();
        let result = handler(&stores, None).handle(command(user, "Free")).await.unwrap();

        let InitializePaymentResult::Free(sub) = result else {
            panic!("expected a free subscription");
        };
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.end_date.is_after(&Timestamp::now().add_days(27)));
        assert!(sub.end_date.is_before(&Timestamp::now().add_days(32)));
        assert_eq!(stores.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn free_tier_twice_extends_the_same_subscription() {
        let stores = Stores::new();
        let user = UserId::new();
        let handler = handler(&stores, None);
        handler.handle(command(user, "free")).await.unwrap();
        let InitializePaymentResult::Free(extended) =
            handler.handle(command(user, "free")).await.unwrap()
        else {
            panic!("expected a free subscription");
        };

        assert_eq!(stores.subscriptions.all().await.len(), 1);
        assert!(extended.end_date.is_after(&Timestamp::now().add_days(55)));
    }

    #[tokio::test]
    async fn free_tier_while_paid_is_active_conflicts() {
        let stores = Stores::new();
        let user = UserId::new();
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut paid = Subscription::create_pending(
            SubscriptionId::new(),
            user,
            &plan,
            "sub_ref".into(),
            Timestamp::now(),
        );
        paid.activate_for_plan(&plan, Timestamp::now(), None).unwrap();
        stores.subscriptions.save(&paid).await.unwrap();

        let err = handler(&stores, None).handle(command(user, "free")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn paid_tier_returns_link_and_records_pending() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;

        let result = handler(&stores, Some("https://guildhall.test/return"))
            .handle(command(user.id, "Premium"))
            .await
            .unwrap();
        let InitializePaymentResult::Checkout {
            link,
            reference,
            subscription,
        } = result
        else {
            panic!("expected a checkout");
        };

        assert!(reference.starts_with(&format!("sub_{}_", user.id)));
        assert_eq!(link, format!("https://checkout.test/pay/{}", reference));
        assert_eq!(subscription.status, SubscriptionStatus::Pending);

        let checkout = &stores.gateway.checkouts()[0];
        assert_eq!(checkout.amount_minor, 500_000);
        assert_eq!(checkout.customer_email, "amaka@example.org");
        assert_eq!(checkout.metadata["plan_id"], plan.id.to_string());
    }

    #[tokio::test]
    async fn unknown_or_inactive_plan_is_not_found() {
        let stores = Stores::new();
        let user = stores.member().await;
        let mut plan = stores.plan("gold", 900_000, BillingInterval::Yearly).await;
        plan.deactivate();
        stores.plans.update(&plan).await.unwrap();
        let handler = handler(&stores, Some("https://guildhall.test/return"));

        let err = handler.handle(command(user.id, "gold")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = handler.handle(command(user.id, "platinum")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn missing_redirect_url_is_a_configuration_error() {
        let stores = Stores::new();
        let user = stores.member().await;
        stores.plan("premium", 500_000, BillingInterval::Monthly).await;

        let err = handler(&stores, None)
            .handle(command(user.id, "premium"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Configuration);
        assert_eq!(stores.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_records_nothing() {
        let stores = Stores::new();
        let user = stores.member().await;
        stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        stores.gateway.fail_next(GatewayError::provider("maintenance"));

        let err = handler(&stores, Some("https://guildhall.test/return"))
            .handle(command(user.id, "premium"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamFailure);
        assert!(stores.subscriptions.all().await.is_empty());
    }
}
