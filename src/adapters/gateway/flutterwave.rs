//! Flutterwave-style payment gateway adapter.
//!
//! Implements `PaymentGateway` against the v3 REST API:
//!
//! - `POST /v3/payments` creates a hosted checkout link
//! - `GET /v3/transactions/{id}/verify` verifies by transaction id
//! - `GET /v3/transactions/verify_by_reference?tx_ref=` verifies by reference
//!
//! The API speaks major units (`5000.00`), the port speaks minor units. The
//! conversion happens here and nowhere else.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::domain::subscription::major_to_minor;
use crate::ports::{
    is_valid_transaction_id, CheckoutLink, CheckoutRequest, GatewayError, GatewayErrorCode,
    PaymentGateway, TransactionStatus, VerifiedTransaction,
};

pub const DEFAULT_BASE_URL: &str = "https://api.flutterwave.com";

#[derive(Clone)]
pub struct FlutterwaveConfig {
    secret_key: SecretString,
    base_url: String,
}

impl FlutterwaveConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (sandbox, test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

pub struct FlutterwaveGateway {
    config: FlutterwaveConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct PaymentLinkData {
    link: String,
}

#[derive(Deserialize)]
struct TransactionData {
    id: serde_json::Value,
    tx_ref: String,
    status: String,
    amount: f64,
    currency: String,
    #[serde(default)]
    customer: Option<CustomerData>,
    #[serde(default)]
    meta: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct CustomerData {
    email: Option<String>,
}

impl FlutterwaveGateway {
    pub fn new(config: FlutterwaveConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn read<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(format!("{}: not found", operation))
                .with_provider_code(status.as_u16().to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::error!(
                operation,
                http_status = status.as_u16(),
                "gateway rejected credentials"
            );
            return Err(GatewayError::new(
                GatewayErrorCode::AuthenticationError,
                "Gateway rejected the secret key",
            )
            .with_provider_code(status.as_u16().to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                http_status = status.as_u16(),
                error = %error_text,
                "gateway call failed"
            );
            let code = if status.is_client_error() {
                GatewayErrorCode::InvalidRequest
            } else {
                GatewayErrorCode::ProviderError
            };
            return Err(GatewayError::new(code, format!("Gateway API error: {}", error_text))
                .with_provider_code(status.as_u16().to_string()));
        }

        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse gateway response: {}", e))
        })?;
        if envelope.status != "success" {
            return Err(GatewayError::provider(envelope.message.unwrap_or_else(|| {
                format!("{} returned status {}", operation, envelope.status)
            })));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::provider(format!("{} returned no data", operation)))
    }

    fn to_verified(data: TransactionData) -> VerifiedTransaction {
        let transaction_id = match data.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        VerifiedTransaction {
            transaction_id,
            reference: data.tx_ref,
            status: match data.status.as_str() {
                "successful" => TransactionStatus::Successful,
                "pending" => TransactionStatus::Pending,
                _ => TransactionStatus::Failed,
            },
            amount_minor: major_to_minor(data.amount),
            currency: data.currency,
            customer_email: data.customer.and_then(|c| c.email),
            metadata: data.meta.unwrap_or(serde_json::Value::Null),
        }
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveGateway {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutLink, GatewayError> {
        let mut body = json!({
            "tx_ref": request.reference,
            "amount": request.amount_minor as f64 / 100.0,
            "currency": request.currency,
            "redirect_url": request.redirect_url,
            "customer": {
                "email": request.customer_email,
                "name": request.customer_name,
            },
            "customizations": { "title": request.title },
            "meta": request.metadata,
        });
        if let Some(plan) = &request.gateway_plan_id {
            body["payment_plan"] = json!(plan);
        }

        let response = self
            .http_client
            .post(self.url("/v3/payments"))
            .bearer_auth(self.config.secret_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let data: PaymentLinkData = Self::read(response, "create_checkout").await?;
        tracing::info!(reference = %request.reference, "checkout link created");
        Ok(CheckoutLink { link: data.link })
    }

    async fn verify_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedTransaction, GatewayError> {
        if !is_valid_transaction_id(transaction_id) {
            return Err(GatewayError::not_found("malformed transaction id"));
        }
        let response = self
            .http_client
            .get(self.url(&format!("/v3/transactions/{}/verify", transaction_id)))
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let data: TransactionData = Self::read(response, "verify_transaction").await?;
        Ok(Self::to_verified(data))
    }

    async fn verify_by_reference(
        &self,
        reference: &str,
    ) -> Result<VerifiedTransaction, GatewayError> {
        let response = self
            .http_client
            .get(self.url("/v3/transactions/verify_by_reference"))
            .query(&[("tx_ref", reference)])
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let data: TransactionData = Self::read(response, "verify_by_reference").await?;
        Ok(Self::to_verified(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(status: &str) -> TransactionData {
        serde_json::from_value(json!({
            "id": 4957102,
            "tx_ref": "sub_u_1700000000000",
            "status": status,
            "amount": 5000.5,
            "currency": "NGN",
            "customer": { "email": "ada@example.org" },
            "meta": { "plan_id": "p-1" }
        }))
        .unwrap()
    }

    #[test]
    fn maps_successful_transaction_to_minor_units() {
        let tx = FlutterwaveGateway::to_verified(transaction("successful"));
        assert_eq!(tx.transaction_id, "4957102");
        assert_eq!(tx.amount_minor, 500_050);
        assert!(tx.is_successful());
        assert_eq!(tx.customer_email.as_deref(), Some("ada@example.org"));
        assert_eq!(tx.metadata_plan_id(), Some("p-1"));
    }

    #[test]
    fn unknown_statuses_are_failures() {
        let tx = FlutterwaveGateway::to_verified(transaction("reversed"));
        assert_eq!(tx.status, TransactionStatus::Failed);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = FlutterwaveGateway::new(
            FlutterwaveConfig::new("FLWSECK_TEST").with_base_url("http://localhost:9999/"),
        );
        assert_eq!(gateway.url("/v3/payments"), "http://localhost:9999/v3/payments");
    }

    #[tokio::test]
    async fn malformed_transaction_id_never_leaves_the_process() {
        // Nothing listens on the discard port; a request would be a network error.
        let gateway = FlutterwaveGateway::new(
            FlutterwaveConfig::new("sk_test").with_base_url("http://127.0.0.1:9"),
        );
        let err = gateway
            .verify_transaction("1/../../v3/transfers")
            .await
            .unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NotFound);
    }
}
