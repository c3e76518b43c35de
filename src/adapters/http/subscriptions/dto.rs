//! Request and response bodies for subscription endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::handlers::subscription::{
    InitializePaymentResult, VerifyPaymentOutcome, WebhookOutcome,
};
use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::{major_to_minor, BillingInterval, PlanEdit, Subscription};
use crate::ports::is_valid_transaction_id;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InitializeRequest {
    /// `free` or the name of an active plan.
    #[validate(length(min = 1, max = 80))]
    pub tier: String,
}

/// Accepted as JSON body or, for gateway redirects, as query string.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyRequest {
    #[serde(default)]
    #[validate(custom(function = "path_safe_transaction_id"))]
    pub transaction_id: String,
    /// Our checkout reference; the gateway redirect names it `tx_ref`.
    #[serde(default, alias = "tx_ref")]
    #[validate(length(min = 1, max = 128))]
    pub reference: Option<String>,
}

/// Empty means "verify by reference instead".
fn path_safe_transaction_id(value: &str) -> Result<(), validator::ValidationError> {
    if value.is_empty() || is_valid_transaction_id(value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("transaction_id"))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub gateway_plan_id: Option<String>,
    /// Major units, e.g. `5000.00`.
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub currency: Option<String>,
    pub interval: BillingInterval,
    #[serde(default)]
    pub features: Vec<String>,
}

impl CreatePlanRequest {
    pub fn price_minor(&self) -> i64 {
        major_to_minor(self.price)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[serde(default)]
    pub add_features: Vec<String>,
    pub active: Option<bool>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub interval: Option<BillingInterval>,
}

impl From<UpdatePlanRequest> for PlanEdit {
    fn from(request: UpdatePlanRequest) -> Self {
        PlanEdit {
            name: request.name,
            add_features: request.add_features,
            active: request.active,
            price_minor: request.price.map(major_to_minor),
            interval: request.interval,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitializeResponse {
    Free {
        subscription: Subscription,
    },
    Checkout {
        payment_link: String,
        reference: String,
        subscription: Subscription,
    },
}

impl From<InitializePaymentResult> for InitializeResponse {
    fn from(result: InitializePaymentResult) -> Self {
        match result {
            InitializePaymentResult::Free(subscription) => {
                InitializeResponse::Free { subscription }
            }
            InitializePaymentResult::Checkout {
                link,
                reference,
                subscription,
            } => InitializeResponse::Checkout {
                payment_link: link,
                reference,
                subscription,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyResponse {
    Activated { subscription: Subscription },
    AlreadyProcessed { message: String },
}

impl From<VerifyPaymentOutcome> for VerifyResponse {
    fn from(outcome: VerifyPaymentOutcome) -> Self {
        match outcome {
            VerifyPaymentOutcome::Activated(subscription) => {
                VerifyResponse::Activated { subscription }
            }
            VerifyPaymentOutcome::AlreadyProcessed => VerifyResponse::AlreadyProcessed {
                message: "Payment already processed".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<SubscriptionId>,
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        let (status, subscription_id) = match outcome {
            WebhookOutcome::Activated { subscription_id } => ("activated", Some(subscription_id)),
            WebhookOutcome::AlreadyActive { subscription_id } => {
                ("already_active", Some(subscription_id))
            }
            WebhookOutcome::Cancelled { subscription_id } => ("cancelled", Some(subscription_id)),
            WebhookOutcome::AlreadyCancelled { subscription_id } => {
                ("already_cancelled", Some(subscription_id))
            }
            WebhookOutcome::Ignored { .. } => ("ignored", None),
        };
        Self {
            status,
            subscription_id,
        }
    }
}
