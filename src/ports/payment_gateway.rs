//! Payment gateway port for hosted checkout and transaction verification.
//!
//! Shaped after Flutterwave's standard checkout: the backend asks for a
//! payment link, the member pays on the gateway's page, and the gateway
//! redirects back with a transaction id that is verified server-side.
//! Amounts crossing this port are integer minor units.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::subscription::SubscriptionError;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout and return the link the customer follows.
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutLink, GatewayError>;

    /// Verify a transaction by the gateway's transaction id.
    async fn verify_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedTransaction, GatewayError>;

    /// Verify a transaction by our checkout reference.
    async fn verify_by_reference(&self, reference: &str)
        -> Result<VerifiedTransaction, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Our reference for the checkout (`sub_{userId}_{unixMillis}`).
    pub reference: String,
    pub amount_minor: i64,
    pub currency: String,
    /// Where the gateway sends the customer after paying.
    pub redirect_url: String,
    pub customer_email: String,
    pub customer_name: String,
    /// Gateway-side recurring plan, when the plan has one.
    pub gateway_plan_id: Option<String>,
    pub title: String,
    /// Echoed back by the gateway on verification.
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLink {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Successful,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedTransaction {
    pub transaction_id: String,
    pub reference: String,
    pub status: TransactionStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub customer_email: Option<String>,
    pub metadata: serde_json::Value,
}

impl VerifiedTransaction {
    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Successful
    }

    /// Plan id placed in checkout metadata, if any.
    pub fn metadata_plan_id(&self) -> Option<&str> {
        self.metadata.get("plan_id").and_then(serde_json::Value::as_str)
    }
}

/// Gateway transaction ids are placed in URL paths, so only
/// `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_transaction_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// Gateway's own error code or HTTP status, if available.
    pub provider_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    NetworkError,
    AuthenticationError,
    /// Unknown transaction or reference.
    NotFound,
    InvalidRequest,
    ProviderError,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NotFound, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for SubscriptionError {
    fn from(err: GatewayError) -> Self {
        match err.code {
            GatewayErrorCode::NotFound => SubscriptionError::VerificationFailed(err.message),
            _ => SubscriptionError::Gateway(err.to_string()),
        }
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let provider_code = err.provider_code.clone();
        let domain: DomainError = SubscriptionError::from(err).into();
        match provider_code {
            Some(code) if domain.code == ErrorCode::UpstreamFailure => {
                domain.with_detail("provider_code", code)
            }
            _ => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_transaction_is_a_verification_failure() {
        let err: DomainError = GatewayError::not_found("no such transaction").into();
        assert_eq!(err.code, ErrorCode::VerificationFailed);
    }

    #[test]
    fn provider_failures_carry_provider_code() {
        let err: DomainError = GatewayError::provider("bad gateway")
            .with_provider_code("502")
            .into();
        assert_eq!(err.code, ErrorCode::UpstreamFailure);
        assert_eq!(err.details.get("provider_code"), Some(&"502".to_string()));
    }

    #[test]
    fn metadata_plan_id_is_read_from_metadata() {
        let tx = VerifiedTransaction {
            transaction_id: "1".into(),
            reference: "sub_x_1".into(),
            status: TransactionStatus::Successful,
            amount_minor: 100,
            currency: "NGN".into(),
            customer_email: None,
            metadata: serde_json::json!({ "plan_id": "abc" }),
        };
        assert!(tx.is_successful());
        assert_eq!(tx.metadata_plan_id(), Some("abc"));
    }

    #[test]
    fn transaction_ids_are_restricted_to_path_safe_characters() {
        assert!(is_valid_transaction_id("4957102"));
        assert!(is_valid_transaction_id("tx-1001_a"));
        assert!(!is_valid_transaction_id(""));
        assert!(!is_valid_transaction_id("1/../../v3/transfers"));
        assert!(!is_valid_transaction_id("1?x=2"));
        assert!(!is_valid_transaction_id("%2e%2e"));
        assert!(!is_valid_transaction_id(&"9".repeat(129)));
    }
}
