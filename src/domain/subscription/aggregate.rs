//! Subscription aggregate.
//!
//! # Invariants
//!
//! - `start_date <= end_date`
//! - at most one `active` subscription per user is used for gating
//! - an `active` subscription whose end date has passed is treated as
//!   cancelled and flipped on the next read

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, OwnedByUser, PlanId, StateMachine, SubscriptionId, Timestamp, UserId,
};

use super::{Plan, PlanSnapshot, SubscriptionStatus, Tier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: Option<PlanId>,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Recurring-subscription id assigned by the payment gateway.
    pub gateway_subscription_id: Option<String>,
    /// Checkout reference (`sub_{user}_{millis}`) of the pending payment.
    pub checkout_reference: Option<String>,
    pub plan_snapshot: Option<PlanSnapshot>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Active free subscription for one calendar month from `now`.
    pub fn create_free(id: SubscriptionId, user_id: UserId, now: Timestamp) -> Self {
        Self {
            id,
            user_id,
            plan_id: None,
            tier: Tier::free(),
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: now.add_months(1),
            gateway_subscription_id: None,
            checkout_reference: None,
            plan_snapshot: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pending paid subscription awaiting gateway confirmation.
    pub fn create_pending(
        id: SubscriptionId,
        user_id: UserId,
        plan: &Plan,
        checkout_reference: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            plan_id: Some(plan.id),
            tier: plan.tier(),
            status: SubscriptionStatus::Pending,
            start_date: now,
            end_date: now,
            gateway_subscription_id: None,
            checkout_reference: Some(checkout_reference),
            plan_snapshot: Some(plan.snapshot()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Activates (or renews) onto `plan` for one billing period from `start`.
    pub fn activate_for_plan(
        &mut self,
        plan: &Plan,
        start: Timestamp,
        gateway_subscription_id: Option<String>,
    ) -> Result<(), DomainError> {
        self.status = self.status.transition_to(SubscriptionStatus::Active)?;
        self.plan_id = Some(plan.id);
        self.tier = plan.tier();
        self.plan_snapshot = Some(plan.snapshot());
        self.start_date = start;
        self.end_date = plan.interval.period_end(start);
        if gateway_subscription_id.is_some() {
            self.gateway_subscription_id = gateway_subscription_id;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Activates using the stored snapshot, for gateway-driven activation
    /// where the plan terms were captured at checkout.
    pub fn activate_from_snapshot(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(SubscriptionStatus::Active)?;
        self.start_date = now;
        self.end_date = match &self.plan_snapshot {
            Some(snapshot) => snapshot.interval.period_end(now),
            None => now.add_months(1),
        };
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Extends a free subscription by one calendar month. An unexpired
    /// subscription extends from its end date, otherwise from `now`.
    pub fn extend_free(&mut self, now: Timestamp) -> Result<(), DomainError> {
        let from = if self.status == SubscriptionStatus::Active && self.end_date.is_after(&now) {
            self.end_date
        } else {
            self.start_date = now;
            now
        };
        self.status = self.status.transition_to(SubscriptionStatus::Active)?;
        self.tier = Tier::free();
        self.plan_id = None;
        self.plan_snapshot = None;
        self.end_date = from.add_months(1);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date.is_before(&now)
    }

    /// Flips an active-but-lapsed subscription to cancelled. Returns whether
    /// anything changed.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        if !self.is_expired_at(now) {
            return false;
        }
        self.status = SubscriptionStatus::Cancelled;
        self.updated_at = Timestamp::now();
        true
    }

    /// Cancels with end date `now`. Returns `false` if already cancelled.
    pub fn cancel(&mut self, now: Timestamp) -> Result<bool, DomainError> {
        if self.status == SubscriptionStatus::Cancelled {
            return Ok(false);
        }
        self.status = self.status.transition_to(SubscriptionStatus::Cancelled)?;
        self.end_date = now;
        self.updated_at = Timestamp::now();
        Ok(true)
    }

    pub fn grants_access_at(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && !self.end_date.is_before(&now)
    }
}

impl OwnedByUser for Subscription {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}
