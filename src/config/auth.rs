//! Authentication configuration

use chrono::Duration;
use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// HS256 signing key length floor.
pub const MIN_JWT_SECRET_LEN: usize = 32;

const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;

/// Bearer token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for signing bearer tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64)
    }

    pub fn jwt_secret(&self) -> SecretString {
        SecretString::new(self.jwt_secret.clone())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.jwt_secret.chars().count() < MIN_JWT_SECRET_LEN {
            return Err(ValidationError::WeakJwtSecret(MIN_JWT_SECRET_LEN));
        }
        if !(300..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

/// Seven days.
fn default_token_ttl() -> u64 {
    7 * 24 * 3600
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            jwt_secret: "k".repeat(MIN_JWT_SECRET_LEN),
            ..Default::default()
        }
    }

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl(), Duration::days(7));
    }

    #[test]
    fn test_validation_requires_secret() {
        assert_eq!(
            AuthConfig::default().validate(),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_short_secret() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::WeakJwtSecret(MIN_JWT_SECRET_LEN))
        );
    }

    #[test]
    fn test_validation_token_ttl_bounds() {
        let config = AuthConfig {
            token_ttl_secs: 60,
            ..valid()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTokenTtl));
    }
}
