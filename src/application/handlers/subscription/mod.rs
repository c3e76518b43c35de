//! Subscription and payment reconciliation handlers.

mod access;
mod cancel_subscription;
mod get_status;
mod handle_payment_webhook;
mod initialize_payment;
mod manage_plans;
mod payment_history;
mod verify_payment;

pub use access::SubscriptionAccessChecker;
pub use cancel_subscription::CancelSubscriptionHandler;
pub use get_status::{GetSubscriptionStatusHandler, SubscriptionStatusView};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
};
pub use initialize_payment::{
    CheckoutSettings, InitializePaymentCommand, InitializePaymentHandler, InitializePaymentResult,
};
pub use manage_plans::{CreatePlanCommand, ManagePlansHandler, UpdatePlanCommand};
pub use payment_history::PaymentHistoryHandler;
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentOutcome};
