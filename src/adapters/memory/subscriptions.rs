use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::missing;
use crate::domain::foundation::{DomainError, PlanId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{PaymentRecord, Plan, Subscription, SubscriptionStatus};
use crate::ports::{PaymentHistoryRepository, PlanRepository, SubscriptionRepository};

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored subscription, for test assertions.
    pub async fn all(&self) -> Vec<Subscription> {
        self.subscriptions.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        match self.subscriptions.write().await.get_mut(&subscription.id) {
            Some(stored) => {
                *stored = subscription.clone();
                Ok(())
            }
            None => Err(missing("Subscription", subscription.id)),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(id).cloned())
    }

    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| &s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .max_by_key(|s| s.updated_at)
            .cloned())
    }

    async fn find_by_gateway_subscription_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .find(|s| s.gateway_subscription_id.as_deref() == Some(gateway_subscription_id))
            .cloned())
    }

    async fn find_by_checkout_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .find(|s| s.checkout_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn list_active_user_ids(&self, now: Timestamp) -> Result<Vec<UserId>, DomainError> {
        let mut ids: Vec<UserId> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.grants_access_at(now))
            .map(|s| s.user_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn count_by_plan(&self, plan_id: &PlanId) -> Result<u64, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.plan_id.as_ref() == Some(plan_id))
            .count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<HashMap<PlanId, Plan>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn save(&self, plan: &Plan) -> Result<(), DomainError> {
        let mut plans = self.plans.write().await;
        if plans.values().any(|p| p.name == plan.name) {
            return Err(DomainError::conflict("A plan with this name already exists")
                .with_detail("field", "name"));
        }
        plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn update(&self, plan: &Plan) -> Result<(), DomainError> {
        let mut plans = self.plans.write().await;
        if plans.values().any(|p| p.name == plan.name && p.id != plan.id) {
            return Err(DomainError::conflict("A plan with this name already exists"));
        }
        match plans.get_mut(&plan.id) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(())
            }
            None => Err(missing("Plan", plan.id)),
        }
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.plans.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Plan>, DomainError> {
        let name = name.to_lowercase();
        Ok(self
            .plans
            .read()
            .await
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn find_by_price(
        &self,
        price_minor: i64,
        currency: &str,
    ) -> Result<Vec<Plan>, DomainError> {
        Ok(self
            .plans
            .read()
            .await
            .values()
            .filter(|p| {
                p.active
                    && p.price_minor == price_minor
                    && p.currency.eq_ignore_ascii_case(currency)
            })
            .cloned()
            .collect())
    }

    async fn list(&self, include_inactive: bool) -> Result<Vec<Plan>, DomainError> {
        let mut plans: Vec<Plan> = self
            .plans
            .read()
            .await
            .values()
            .filter(|p| include_inactive || p.active)
            .cloned()
            .collect();
        plans.sort_by_key(|p| p.price_minor);
        Ok(plans)
    }
}

#[derive(Default)]
pub struct InMemoryPaymentHistoryRepository {
    records: RwLock<Vec<PaymentRecord>>,
}

impl InMemoryPaymentHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PaymentHistoryRepository for InMemoryPaymentHistoryRepository {
    async fn append(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.transaction_id == record.transaction_id) {
            return Err(DomainError::conflict("Transaction already recorded")
                .with_detail("transaction_id", record.transaction_id.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.transaction_id == transaction_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let mut mine: Vec<PaymentRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}
