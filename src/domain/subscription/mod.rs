//! Subscription module - plans, subscriptions, payment history and the
//! gateway webhook vocabulary.

mod aggregate;
mod errors;
mod payment;
mod plan;
mod status;
mod tier;
mod webhook;

pub use aggregate::Subscription;
pub use errors::SubscriptionError;
pub use payment::{major_to_minor, PaymentRecord, PaymentStatus, PaymentType};
pub use plan::{normalize_currency, BillingInterval, NewPlan, Plan, PlanEdit, PlanSnapshot};
pub use status::SubscriptionStatus;
pub use tier::Tier;
pub use webhook::{CompletedPayment, GatewayEvent, WebhookVerifier, WEBHOOK_SECRET_HEADER};

use crate::domain::foundation::{Timestamp, UserId};

/// Checkout reference for a paid checkout: `sub_{userId}_{unixMillis}`.
pub fn checkout_reference(user_id: &UserId, now: Timestamp) -> String {
    format!("sub_{}_{}", user_id, now.as_unix_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_reference_embeds_user_and_millis() {
        let user = UserId::new();
        let now = Timestamp::now();
        let reference = checkout_reference(&user, now);
        let parts: Vec<&str> = reference.splitn(3, '_').collect();
        assert_eq!(parts[0], "sub");
        assert_eq!(parts[1], user.to_string());
        assert_eq!(parts[2].parse::<i64>().unwrap(), now.as_unix_millis());
    }
}
