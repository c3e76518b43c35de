//! Payment gateway configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::gateway::FLUTTERWAVE_BASE_URL;

/// Hosted-checkout gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Gateway secret API key
    #[serde(default)]
    pub secret_key: String,

    /// Where members land after the hosted checkout
    pub redirect_url: Option<String>,

    /// Shared secret the gateway sends in the `verif-hash` header
    #[serde(default)]
    pub webhook_hash: String,

    /// ISO 4217 code used for new plans
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl PaymentConfig {
    /// True when paid checkout can work: a key and a redirect target.
    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty() && self.redirect_url.is_some()
    }

    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("PAYMENT__BASE_URL"));
        }
        if let Some(url) = &self.redirect_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("PAYMENT__REDIRECT_URL"));
            }
            if production && !url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps("PAYMENT__REDIRECT_URL"));
            }
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if production {
            if self.secret_key.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"));
            }
            if self.webhook_hash.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_HASH"));
            }
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            redirect_url: None,
            webhook_hash: String::new(),
            currency: default_currency(),
        }
    }
}

fn default_base_url() -> String {
    FLUTTERWAVE_BASE_URL.to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_defaults_validate_in_development() {
        let config = PaymentConfig::default();
        assert!(!config.is_configured());
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn test_production_requires_key_and_webhook_hash() {
        let mut config = PaymentConfig {
            redirect_url: Some("https://guildhall.example.org/payment/callback".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(true),
            Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"))
        );
        config.secret_key = "FLWSECK_TEST-abc".to_string();
        assert_eq!(
            config.validate(true),
            Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_HASH"))
        );
        config.webhook_hash = "hash".to_string();
        assert!(config.validate(true).is_ok());
        assert!(config.is_configured());
    }

    #[test]
    fn test_production_redirect_must_be_https() {
        let config = PaymentConfig {
            redirect_url: Some("http://guildhall.example.org/cb".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(true),
            Err(ValidationError::MustBeHttps("PAYMENT__REDIRECT_URL"))
        );
    }

    #[test]
    fn test_currency_must_be_iso_code() {
        let config = PaymentConfig {
            currency: "NAIRA".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(false), Err(ValidationError::InvalidCurrency));
    }
}
