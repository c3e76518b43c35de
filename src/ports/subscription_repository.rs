//! Subscription and plan repository ports.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Plan, Subscription};

/// Repository port for subscriptions.
///
/// A user may accumulate several rows over time (cancelled, pending, free).
/// Gating only ever looks at the most recent `active` one.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if the subscription doesn't exist
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Most recently updated `active` subscription of the user, whether or
    /// not its end date has passed.
    async fn find_active_by_user(&self, user_id: &UserId)
        -> Result<Option<Subscription>, DomainError>;

    async fn find_by_gateway_subscription_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    async fn find_by_checkout_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Users with an `active` subscription ending at or after `now`.
    async fn list_active_user_ids(&self, now: Timestamp) -> Result<Vec<UserId>, DomainError>;

    /// Number of subscriptions (any status) referencing the plan.
    async fn count_by_plan(&self, plan_id: &PlanId) -> Result<u64, DomainError>;
}

/// Repository port for plans.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// # Errors
    ///
    /// - `Conflict` if a plan with the same name exists
    async fn save(&self, plan: &Plan) -> Result<(), DomainError>;

    async fn update(&self, plan: &Plan) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError>;

    /// Plan by its lowercase name, active or not.
    async fn find_by_name(&self, name: &str) -> Result<Option<Plan>, DomainError>;

    /// Active plans with exactly this price and currency.
    async fn find_by_price(&self, price_minor: i64, currency: &str)
        -> Result<Vec<Plan>, DomainError>;

    /// Cheapest first.
    async fn list(&self, include_inactive: bool) -> Result<Vec<Plan>, DomainError>;
}
