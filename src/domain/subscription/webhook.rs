//! Payment gateway webhook verification and event parsing.
//!
//! The gateway authenticates webhooks with a shared secret sent verbatim in
//! the `verif-hash` header. There is no signature or timestamp, so the only
//! check is a constant-time comparison against the configured secret.

use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::payment::major_to_minor;
use super::SubscriptionError;

pub const WEBHOOK_SECRET_HEADER: &str = "verif-hash";

/// Verifier for the shared-secret webhook header.
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the header value and parses the payload.
    ///
    /// # Errors
    ///
    /// - `InvalidWebhookSignature` - header missing or different from the secret
    /// - `ValidationFailed` - payload is not a recognizable event envelope
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        provided: Option<&str>,
    ) -> Result<GatewayEvent, SubscriptionError> {
        let provided = provided.ok_or(SubscriptionError::InvalidWebhookSignature)?;
        if self.secret.is_empty()
            || !constant_time_compare(self.secret.as_bytes(), provided.as_bytes())
        {
            return Err(SubscriptionError::InvalidWebhookSignature);
        }
        GatewayEvent::parse(payload)
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Webhook event kinds the reconciler acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    SubscriptionPaymentCompleted(CompletedPayment),
    SubscriptionCancelled { gateway_subscription_id: String },
    /// Acknowledged and ignored.
    Other { event: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedPayment {
    pub gateway_subscription_id: String,
    pub transaction_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl GatewayEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, SubscriptionError> {
        let envelope: Envelope = serde_json::from_slice(payload)
            .map_err(|e| SubscriptionError::validation("payload", e.to_string()))?;
        let data = envelope.data;

        match envelope.event.as_str() {
            "subscription.payment.completed" => {
                let gateway_subscription_id = subscription_id(&data)?;
                let transaction_id = string_field(&data, &["id", "transaction_id", "tx_ref"])
                    .ok_or_else(|| {
                        SubscriptionError::validation("data.id", "missing transaction id")
                    })?;
                let amount_minor = data
                    .get("amount")
                    .and_then(serde_json::Value::as_f64)
                    .map(major_to_minor)
                    .unwrap_or(0);
                let currency = string_field(&data, &["currency"]).unwrap_or_default();
                Ok(GatewayEvent::SubscriptionPaymentCompleted(CompletedPayment {
                    gateway_subscription_id,
                    transaction_id,
                    amount_minor,
                    currency,
                    raw: data,
                }))
            }
            "subscription.cancelled" => Ok(GatewayEvent::SubscriptionCancelled {
                gateway_subscription_id: subscription_id(&data)?,
            }),
            other => Ok(GatewayEvent::Other {
                event: other.to_string(),
            }),
        }
    }
}

fn subscription_id(data: &serde_json::Value) -> Result<String, SubscriptionError> {
    string_field(data, &["subscription_id"])
        .or_else(|| data.get("subscription").and_then(|s| string_field(s, &["id"])))
        .ok_or_else(|| {
            SubscriptionError::validation("data.subscription_id", "missing subscription id")
        })
}

/// First present key among `keys`, accepting strings or numbers.
fn string_field(data: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match data.get(*key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
