//! HandlePaymentWebhookHandler - reconciles gateway webhook events.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    CompletedPayment, GatewayEvent, PaymentRecord, SubscriptionError, SubscriptionStatus,
    WebhookVerifier,
};
use crate::ports::{PaymentHistoryRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body.
    pub payload: Vec<u8>,
    /// Value of the `verif-hash` header.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Activated { subscription_id: SubscriptionId },
    /// Subscription was already active; only the payment was recorded.
    AlreadyActive { subscription_id: SubscriptionId },
    Cancelled { subscription_id: SubscriptionId },
    AlreadyCancelled { subscription_id: SubscriptionId },
    /// Event type the reconciler does not act on.
    Ignored { event: String },
}

pub struct HandlePaymentWebhookHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentHistoryRepository>,
    verifier: WebhookVerifier,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentHistoryRepository>,
        verifier: WebhookVerifier,
    ) -> Self {
        Self {
            subscriptions,
            payments,
            verifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, DomainError> {
        // 1. Authenticate and parse
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, cmd.secret.as_deref())
            .inspect_err(|e| tracing::warn!(error = %e, "webhook rejected"))?;

        // 2. Dispatch
        match event {
            GatewayEvent::SubscriptionPaymentCompleted(payment) => {
                self.payment_completed(payment).await
            }
            GatewayEvent::SubscriptionCancelled {
                gateway_subscription_id,
            } => self.cancelled(&gateway_subscription_id).await,
            GatewayEvent::Other { event } => {
                tracing::debug!(event = %event, "webhook event ignored");
                Ok(WebhookOutcome::Ignored { event })
            }
        }
    }

    async fn payment_completed(
        &self,
        payment: CompletedPayment,
    ) -> Result<WebhookOutcome, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_by_gateway_subscription_id(&payment.gateway_subscription_id)
            .await?
            .ok_or_else(|| {
                SubscriptionError::SubscriptionNotFound(payment.gateway_subscription_id.clone())
            })?;

        let activated = subscription.status != SubscriptionStatus::Active;
        if activated {
            subscription.activate_from_snapshot(Timestamp::now())?;
            self.subscriptions.update(&subscription).await?;
        }

        if self
            .payments
            .find_by_transaction_id(&payment.transaction_id)
            .await?
            .is_none()
        {
            let record = PaymentRecord::successful_subscription(
                subscription.user_id,
                payment.transaction_id.clone(),
                payment.amount_minor,
                payment.currency.clone(),
                payment.raw,
            );
            match self.payments.append(&record).await {
                Ok(()) => {}
                Err(e) if e.is(ErrorCode::Conflict) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            subscription_id = %subscription.id,
            transaction_id = %payment.transaction_id,
            activated,
            "webhook payment reconciled"
        );

        let subscription_id = subscription.id;
        Ok(if activated {
            WebhookOutcome::Activated { subscription_id }
        } else {
            WebhookOutcome::AlreadyActive { subscription_id }
        })
    }

    async fn cancelled(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<WebhookOutcome, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_by_gateway_subscription_id(gateway_subscription_id)
            .await?
            .ok_or_else(|| {
                SubscriptionError::SubscriptionNotFound(gateway_subscription_id.to_string())
            })?;
        let subscription_id = subscription.id;

        if !subscription.cancel(Timestamp::now())? {
            return Ok(WebhookOutcome::AlreadyCancelled { subscription_id });
        }
        self.subscriptions.update(&subscription).await?;
        tracing::info!(subscription_id = %subscription_id, "subscription cancelled by gateway");
        Ok(WebhookOutcome::Cancelled { subscription_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::Stores;
    use crate::domain::foundation::UserId;
    use crate::domain::subscription::{BillingInterval, Subscription};

    const SECRET: &str = "whsec-guildhall";

    fn handler(stores: &Stores) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            stores.subscriptions.clone(),
            stores.payments.clone(),
            WebhookVerifier::new(SECRET),
        )
    }

    fn command(body: serde_json::Value, secret: Option<&str>) -> HandlePaymentWebhookCommand {
        HandlePaymentWebhookCommand {
            payload: serde_json::to_vec(&body).unwrap(),
            secret: secret.map(String::from),
        }
    }

    fn completed(tx: &str) -> serde_json::Value {
        serde_json::json!({
            "event": "subscription.payment.completed",
            "data": { "id": tx, "subscription_id": "gw-77", "amount": 5000, "currency": "NGN" }
        })
    }

    async fn pending_with_gateway_id(stores: &Stores) -> Subscription {
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut sub = Subscription::create_pending(
            SubscriptionId::new(),
            UserId::new(),
            &plan,
            "sub_w_1".into(),
            Timestamp::now(),
        );
        sub.gateway_subscription_id = Some("gw-77".into());
        stores.subscriptions.save(&sub).await.unwrap();
        sub
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let stores = Stores::new();
        let err = handler(&stores)
            .handle(command(completed("1"), Some("guess")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = handler(&stores).handle(command(completed("1"), None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn payment_completed_activates_once_and_records_once() {
        let stores = Stores::new();
        let sub = pending_with_gateway_id(&stores).await;
        let handler = handler(&stores);

        let first = handler.handle(command(completed("tx-1"), Some(SECRET))).await.unwrap();
        assert_eq!(first, WebhookOutcome::Activated { subscription_id: sub.id });

        let replay = handler.handle(command(completed("tx-1"), Some(SECRET))).await.unwrap();
        assert_eq!(replay, WebhookOutcome::AlreadyActive { subscription_id: sub.id });
        assert_eq!(stores.payments.count().await, 1);

        let stored = stores.subscriptions.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn unknown_gateway_subscription_is_not_found() {
        let stores = Stores::new();
        let err = handler(&stores)
            .handle(command(completed("tx-9"), Some(SECRET)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn cancellation_replay_is_a_no_op_success() {
        let stores = Stores::new();
        let sub = pending_with_gateway_id(&stores).await;
        let handler = handler(&stores);
        let body = serde_json::json!({
            "event": "subscription.cancelled",
            "data": { "subscription": { "id": "gw-77" } }
        });

        let first = handler.handle(command(body.clone(), Some(SECRET))).await.unwrap();
        assert_eq!(first, WebhookOutcome::Cancelled { subscription_id: sub.id });
        let again = handler.handle(command(body, Some(SECRET))).await.unwrap();
        assert_eq!(again, WebhookOutcome::AlreadyCancelled { subscription_id: sub.id });
    }

    #[tokio::test]
    async fn other_events_are_ignored() {
        let stores = Stores::new();
        let body = serde_json::json!({ "event": "charge.completed", "data": {} });
        let outcome = handler(&stores).handle(command(body, Some(SECRET))).await.unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event: "charge.completed".into()
            }
        );
    }
}
