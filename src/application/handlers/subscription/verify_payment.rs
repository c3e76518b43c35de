//! VerifyPaymentHandler - confirms a checkout with the gateway and activates
//! the subscription.
//!
//! The payment ledger is the idempotency gate. The subscription is activated
//! first and the record appended last, so a failed write leaves the
//! transaction unrecorded and a retry completes it. A duplicate transaction
//! id (found up front or rejected by the unique index) reports
//! `AlreadyProcessed`.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, SubscriptionId, Timestamp, UserId};
use crate::domain::notification::template::html_escape;
use crate::domain::subscription::{
    PaymentRecord, Plan, Subscription, SubscriptionError, SubscriptionStatus,
};
use crate::ports::{
    EmailMessage, EmailSender, PaymentGateway, PaymentHistoryRepository, PlanRepository,
    SubscriptionRepository, UserRepository, VerifiedTransaction,
};

#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    pub user_id: UserId,
    pub transaction_id: String,
    /// Checkout reference (`tx_ref`), used when no transaction id is given.
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub enum VerifyPaymentOutcome {
    Activated(Subscription),
    /// The transaction was already recorded; nothing changed.
    AlreadyProcessed,
}

pub struct VerifyPaymentHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    payments: Arc<dyn PaymentHistoryRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn PaymentGateway>,
    email: Arc<dyn EmailSender>,
}

fn verification_failed(reason: &str) -> DomainError {
    SubscriptionError::verification_failed(reason).into()
}

impl VerifyPaymentHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        payments: Arc<dyn PaymentHistoryRepository>,
        users: Arc<dyn UserRepository>,
        gateway: Arc<dyn PaymentGateway>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            payments,
            users,
            gateway,
            email,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<VerifyPaymentOutcome, DomainError> {
        let transaction_id = cmd.transaction_id.trim();
        let reference = cmd.reference.as_deref().map(str::trim).filter(|r| !r.is_empty());

        // 1. Ask the gateway
        let tx = match (transaction_id.is_empty(), reference) {
            (false, _) => self.gateway.verify_transaction(transaction_id).await?,
            (true, Some(reference)) => self.gateway.verify_by_reference(reference).await?,
            (true, None) => {
                return Err(DomainError::validation(
                    "transaction_id",
                    "transaction_id or tx_ref is required",
                ))
            }
        };
        if !tx.is_successful() {
            tracing::info!(
                transaction_id = %tx.transaction_id,
                status = ?tx.status,
                "payment not successful"
            );
            return Err(verification_failed("Payment was not successful"));
        }
        let metadata_owner = tx.metadata.get("user_id").and_then(serde_json::Value::as_str);
        if let Some(owner) = metadata_owner {
            if owner != cmd.user_id.to_string() {
                return Err(verification_failed("Transaction belongs to another account"));
            }
        }

        // 2. Duplicate check
        if self
            .payments
            .find_by_transaction_id(&tx.transaction_id)
            .await?
            .is_some()
        {
            tracing::info!(transaction_id = %tx.transaction_id, "transaction already processed");
            return Ok(VerifyPaymentOutcome::AlreadyProcessed);
        }

        // 3. Plan and target subscription
        let plan = self.resolve_plan(&tx).await?;
        let pending = self
            .subscriptions
            .find_by_checkout_reference(&tx.reference)
            .await?;
        if pending.as_ref().is_some_and(|p| p.user_id != cmd.user_id) {
            return Err(verification_failed("Checkout belongs to another account"));
        }
        if metadata_owner.is_none() && pending.is_none() {
            self.check_payer_email(&cmd.user_id, &tx).await?;
        }
        let current = self.subscriptions.find_active_by_user(&cmd.user_id).await?;

        // 4. Activate
        let now = Timestamp::now();
        let gateway_subscription_id = tx
            .metadata
            .get("subscription_id")
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let (mut subscription, is_new) = match (pending, current) {
            (Some(pending), Some(mut previous)) if previous.id != pending.id => {
                previous.cancel(now)?;
                self.subscriptions.update(&previous).await?;
                (pending, false)
            }
            (Some(pending), _) => (pending, false),
            (None, Some(current)) => (current, false),
            (None, None) => (
                Subscription::create_pending(
                    SubscriptionId::new(),
                    cmd.user_id,
                    &plan,
                    tx.reference.clone(),
                    now,
                ),
                true,
            ),
        };
        // An earlier attempt activated this checkout but never recorded it.
        let activated_earlier = subscription.status == SubscriptionStatus::Active
            && subscription.checkout_reference.as_deref() == Some(tx.reference.as_str());
        if !activated_earlier {
            subscription.activate_for_plan(&plan, now, gateway_subscription_id)?;
            if is_new {
                self.subscriptions.save(&subscription).await?;
            } else {
                self.subscriptions.update(&subscription).await?;
            }
        }

        // 5. Ledger entry
        let record = PaymentRecord::successful_subscription(
            cmd.user_id,
            tx.transaction_id.clone(),
            tx.amount_minor,
            tx.currency.clone(),
            serde_json::json!({
                "plan_id": plan.id.to_string(),
                "plan": plan.name,
                "reference": tx.reference,
            }),
        );
        match self.payments.append(&record).await {
            Ok(()) => {}
            Err(e) if e.is(ErrorCode::Conflict) => {
                tracing::info!(
                    transaction_id = %tx.transaction_id,
                    "transaction recorded concurrently"
                );
                return Ok(VerifyPaymentOutcome::AlreadyProcessed);
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            user_id = %cmd.user_id,
            subscription_id = %subscription.id,
            plan = %plan.name,
            end_date = %subscription.end_date,
            "subscription activated"
        );

        self.send_confirmation(&cmd.user_id, &plan, &subscription).await;
        Ok(VerifyPaymentOutcome::Activated(subscription))
    }

    /// Metadata plan id is authoritative. Without one, exactly one active plan
    /// must match the paid amount and currency.
    async fn resolve_plan(&self, tx: &VerifiedTransaction) -> Result<Plan, DomainError> {
        let plan = match tx.metadata_plan_id() {
            Some(raw) => {
                let id: PlanId = raw
                    .parse()
                    .map_err(|_| verification_failed("Checkout metadata names an invalid plan"))?;
                self.plans
                    .find_by_id(&id)
                    .await?
                    .ok_or_else(|| verification_failed("Checkout metadata names an unknown plan"))?
            }
            None => {
                let mut candidates = self
                    .plans
                    .find_by_price(tx.amount_minor, &tx.currency)
                    .await?;
                if candidates.len() != 1 {
                    tracing::warn!(
                        transaction_id = %tx.transaction_id,
                        matches = candidates.len(),
                        "cannot resolve plan from amount"
                    );
                    return Err(verification_failed("Cannot determine the plan for this payment"));
                }
                candidates.remove(0)
            }
        };

        if !plan.currency.eq_ignore_ascii_case(&tx.currency) || tx.amount_minor < plan.price_minor {
            return Err(verification_failed("Paid amount does not cover the plan price"));
        }
        Ok(plan)
    }

    /// Transactions that name no owner are only claimable by the account
    /// whose email paid them.
    async fn check_payer_email(
        &self,
        user_id: &UserId,
        tx: &VerifiedTransaction,
    ) -> Result<(), DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| verification_failed("Transaction belongs to another account"))?;
        match tx.customer_email.as_deref() {
            Some(payer) if payer.trim().eq_ignore_ascii_case(&user.email) => Ok(()),
            _ => {
                tracing::warn!(
                    transaction_id = %tx.transaction_id,
                    user_id = %user_id,
                    "unowned transaction does not match the caller's email"
                );
                Err(verification_failed("Transaction belongs to another account"))
            }
        }
    }

    async fn send_confirmation(&self, user_id: &UserId, plan: &Plan, subscription: &Subscription) {
        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "could not load user for confirmation email"
                );
                return;
            }
        };
        let ends = subscription.end_date.as_datetime().format("%B %-d, %Y");
        let message = EmailMessage {
            to: user.email.clone(),
            subject: format!("Your {} membership is active", plan.name),
            html: format!(
                "<p>Hello {},</p><p>Thank you for your payment. \
                 Your <strong>{}</strong> membership is active until {}.</p>",
                html_escape(&user.name),
                html_escape(&plan.name),
                ends
            ),
            text: Some(format!(
                "Hello {}, thank you for your payment. Your {} membership is active until {}.",
                user.name, plan.name, ends
            )),
        };
        if let Err(e) = self.email.send(&message).await {
            tracing::warn!(user_id = %user_id, error = %e, "confirmation email failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::application::handlers::subscription::test_support::{paid, Stores};
    use crate::domain::subscription::BillingInterval;
    use crate::ports::TransactionStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn handler(stores: &Stores) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            stores.subscriptions.clone(),
            stores.plans.clone(),
            stores.payments.clone(),
            stores.users.clone(),
            stores.gateway.clone(),
            stores.email.clone(),
        )
    }

    /// Fails the first write, then behaves like the wrapped store.
    struct FlakySubscriptions {
        inner: Arc<InMemorySubscriptionRepository>,
        failed_once: AtomicBool,
    }

    impl FlakySubscriptions {
        fn new(inner: Arc<InMemorySubscriptionRepository>) -> Self {
            Self {
                inner,
                failed_once: AtomicBool::new(false),
            }
        }

        fn fail_first(&self) -> Result<(), DomainError> {
            if self.failed_once.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DomainError::new(ErrorCode::DatabaseError, "connection reset"))
            }
        }
    }

    #[async_trait]
    impl SubscriptionRepository for FlakySubscriptions {
        async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
            self.fail_first()?;
            self.inner.save(subscription).await
        }

        async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
            self.fail_first()?;
            self.inner.update(subscription).await
        }

        async fn find_by_id(
            &self,
            id: &SubscriptionId,
        ) -> Result<Option<Subscription>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn find_active_by_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<Subscription>, DomainError> {
            self.inner.find_active_by_user(user_id).await
        }

        async fn find_by_gateway_subscription_id(
            &self,
            gateway_subscription_id: &str,
        ) -> Result<Option<Subscription>, DomainError> {
            self.inner
                .find_by_gateway_subscription_id(gateway_subscription_id)
                .await
        }

        async fn find_by_checkout_reference(
            &self,
            reference: &str,
        ) -> Result<Option<Subscription>, DomainError> {
            self.inner.find_by_checkout_reference(reference).await
        }

        async fn list_active_user_ids(&self, now: Timestamp) -> Result<Vec<UserId>, DomainError> {
            self.inner.list_active_user_ids(now).await
        }

        async fn count_by_plan(&self, plan_id: &PlanId) -> Result<u64, DomainError> {
            self.inner.count_by_plan(plan_id).await
        }
    }

    fn command(user_id: UserId, transaction_id: &str) -> VerifyPaymentCommand {
        VerifyPaymentCommand {
            user_id,
            transaction_id: transaction_id.into(),
            reference: None,
        }
    }

    #[tokio::test]
    async fn successful_payment_activates_and_records() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Yearly).await;
        stores.gateway.add_transaction(paid("4957102", &plan, &user.id));

        let outcome = handler(&stores).handle(command(user.id, "4957102")).await.unwrap();
        let VerifyPaymentOutcome::Activated(sub) = outcome else {
            panic!("expected activation");
        };
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.tier.as_str(), "premium");
        assert_eq!(sub.end_date, sub.start_date.add_years(1));
        assert_eq!(stores.payments.count().await, 1);
        assert_eq!(stores.email.sent().len(), 1);
    }

    #[tokio::test]
    async fn second_verification_is_already_processed() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        stores.gateway.add_transaction(paid("77", &plan, &user.id));
        let handler = handler(&stores);

        handler.handle(command(user.id, "77")).await.unwrap();
        let before = stores.subscriptions.all().await;
        let outcome = handler.handle(command(user.id, "77")).await.unwrap();

        assert!(matches!(outcome, VerifyPaymentOutcome::AlreadyProcessed));
        assert_eq!(stores.payments.count().await, 1);
        assert_eq!(stores.subscriptions.all().await, before);
    }

    #[tokio::test]
    async fn failed_transaction_is_a_verification_failure() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut tx = paid("88", &plan, &user.id);
        tx.status = TransactionStatus::Failed;
        stores.gateway.add_transaction(tx);

        let err = handler(&stores).handle(command(user.id, "88")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
        assert_eq!(stores.payments.count().await, 0);
    }

    #[tokio::test]
    async fn unknown_transaction_is_a_verification_failure() {
        let stores = Stores::new();
        let err = handler(&stores)
            .handle(command(UserId::new(), "missing"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
    }

    #[tokio::test]
    async fn pending_checkout_is_the_one_activated() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let tx = paid("99", &plan, &user.id);
        let pending = Subscription::create_pending(
            SubscriptionId::new(),
            user.id,
            &plan,
            tx.reference.clone(),
            Timestamp::now(),
        );
        stores.subscriptions.save(&pending).await.unwrap();
        let free = Subscription::create_free(SubscriptionId::new(), user.id, Timestamp::now());
        stores.subscriptions.save(&free).await.unwrap();
        stores.gateway.add_transaction(tx);

        let VerifyPaymentOutcome::Activated(sub) =
            handler(&stores).handle(command(user.id, "99")).await.unwrap()
        else {
            panic!("expected activation");
        };
        assert_eq!(sub.id, pending.id);
        let find = stores.subscriptions.find_by_id(&free.id).await.unwrap().unwrap();
        assert_eq!(find.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn amount_fallback_requires_a_unique_match() {
        let stores = Stores::new();
        let user = stores.member().await;
        let silver = stores.plan("silver", 200_000, BillingInterval::Monthly).await;
        stores.plan("bronze", 200_000, BillingInterval::Yearly).await;
        let mut tx = paid("55", &silver, &user.id);
        tx.metadata = serde_json::json!({});
        stores.gateway.add_transaction(tx);

        let err = handler(&stores).handle(command(user.id, "55")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
    }

    #[tokio::test]
    async fn amount_fallback_resolves_single_plan() {
        let stores = Stores::new();
        let user = stores.member().await;
        let silver = stores.plan("silver", 200_000, BillingInterval::Monthly).await;
        let mut tx = paid("56", &silver, &user.id);
        tx.metadata = serde_json::json!({});
        stores.gateway.add_transaction(tx);

        let outcome = handler(&stores).handle(command(user.id, "56")).await.unwrap();
        assert!(matches!(
            outcome,
            VerifyPaymentOutcome::Activated(s) if s.plan_id == Some(silver.id)
        ));
    }

    #[tokio::test]
    async fn underpayment_is_rejected() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut tx = paid("57", &plan, &user.id);
        tx.amount_minor = 100;
        stores.gateway.add_transaction(tx);

        let err = handler(&stores).handle(command(user.id, "57")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
    }

    #[tokio::test]
    async fn another_members_transaction_is_rejected() {
        let stores = Stores::new();
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        stores.gateway.add_transaction(paid("58", &plan, &UserId::new()));

        let err = handler(&stores)
            .handle(command(UserId::new(), "58"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_activation() {
        let mut stores = Stores::new();
        stores.email = Arc::new(
            crate::adapters::email::MockEmailSender::new().failing_for("amaka@example.org"),
        );
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        stores.gateway.add_transaction(paid("59", &plan, &user.id));

        let outcome = handler(&stores).handle(command(user.id, "59")).await.unwrap();
        assert!(matches!(outcome, VerifyPaymentOutcome::Activated(_)));
    }

    #[tokio::test]
    async fn redirect_reference_is_verified_when_id_is_absent() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let tx = paid("4100", &plan, &user.id);
        let reference = tx.reference.clone();
        stores.gateway.add_transaction(tx);

        let outcome = handler(&stores)
            .handle(VerifyPaymentCommand {
                user_id: user.id,
                transaction_id: String::new(),
                reference: Some(reference),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, VerifyPaymentOutcome::Activated(_)));
    }

    #[tokio::test]
    async fn missing_id_and_reference_is_a_validation_error() {
        let stores = Stores::new();
        let err = handler(&stores)
            .handle(command(UserId::new(), "  "))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn retry_after_failed_activation_completes_it() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        stores.gateway.add_transaction(paid("4200", &plan, &user.id));
        let handler = VerifyPaymentHandler::new(
            Arc::new(FlakySubscriptions::new(stores.subscriptions.clone())),
            stores.plans.clone(),
            stores.payments.clone(),
            stores.users.clone(),
            stores.gateway.clone(),
            stores.email.clone(),
        );

        let err = handler.handle(command(user.id, "4200")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(stores.payments.count().await, 0);

        let outcome = handler.handle(command(user.id, "4200")).await.unwrap();
        assert!(matches!(outcome, VerifyPaymentOutcome::Activated(_)));
        assert_eq!(stores.payments.count().await, 1);
        let active = stores.subscriptions.find_active_by_user(&user.id).await.unwrap();
        assert_eq!(active.map(|s| s.tier.as_str().to_string()), Some("premium".to_string()));
    }

    #[tokio::test]
    async fn activated_but_unrecorded_checkout_is_recorded_on_retry() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let tx = paid("4300", &plan, &user.id);
        let mut sub = Subscription::create_pending(
            SubscriptionId::new(),
            user.id,
            &plan,
            tx.reference.clone(),
            Timestamp::now(),
        );
        sub.activate_for_plan(&plan, Timestamp::now(), None).unwrap();
        stores.subscriptions.save(&sub).await.unwrap();
        stores.gateway.add_transaction(tx);

        let VerifyPaymentOutcome::Activated(activated) =
            handler(&stores).handle(command(user.id, "4300")).await.unwrap()
        else {
            panic!("expected activation");
        };
        assert_eq!(activated.id, sub.id);
        assert_eq!(activated.end_date, sub.end_date);
        assert_eq!(stores.payments.count().await, 1);
    }

    #[tokio::test]
    async fn unowned_transaction_paid_by_someone_else_is_refused() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut tx = paid("4400", &plan, &user.id);
        tx.metadata = serde_json::json!({});
        tx.reference = "external-ref".into();
        tx.customer_email = Some("chidi@example.org".into());
        stores.gateway.add_transaction(tx);

        let err = handler(&stores).handle(command(user.id, "4400")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
        assert_eq!(stores.payments.count().await, 0);
        assert!(stores.subscriptions.all().await.is_empty());
    }

    #[tokio::test]
    async fn unowned_transaction_without_payer_email_is_refused() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut tx = paid("4500", &plan, &user.id);
        tx.metadata = serde_json::json!({ "plan_id": plan.id.to_string() });
        tx.customer_email = None;
        stores.gateway.add_transaction(tx);

        let err = handler(&stores).handle(command(user.id, "4500")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
    }

    #[tokio::test]
    async fn unowned_transaction_matching_payer_email_is_accepted() {
        let stores = Stores::new();
        let user = stores.member().await;
        let plan = stores.plan("premium", 500_000, BillingInterval::Monthly).await;
        let mut tx = paid("4600", &plan, &user.id);
        tx.metadata = serde_json::json!({ "plan_id": plan.id.to_string() });
        tx.customer_email = Some("Amaka@Example.org".into());
        stores.gateway.add_transaction(tx);

        let outcome = handler(&stores).handle(command(user.id, "4600")).await.unwrap();
        assert!(matches!(outcome, VerifyPaymentOutcome::Activated(_)));
    }
}
