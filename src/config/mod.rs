//! Application configuration module
//!
//! Configuration is read from environment variables (and a `.env` file when
//! present) using the `config` and `dotenvy` crates. Variables carry the
//! `GUILDHALL` prefix and nested values are separated by `__`.
//!
//! # Example
//!
//! ```no_run
//! use guildhall::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod email;
mod error;
mod payment;
mod server;

pub use auth::{AuthConfig, MIN_JWT_SECRET_LEN};
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection. Optional outside production.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bearer token signing
    #[serde(default)]
    pub auth: AuthConfig,

    /// Hosted-checkout gateway
    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `GUILDHALL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GUILDHALL__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GUILDHALL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section. Production additionally
    /// requires a database, gateway secrets and an email API key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let production = self.is_production();
        self.server.validate()?;
        self.database.validate(production)?;
        self.auth.validate()?;
        self.payment.validate(production)?;
        self.email.validate(production)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "GUILDHALL__AUTH__JWT_SECRET",
        "GUILDHALL__DATABASE__URL",
        "GUILDHALL__SERVER__PORT",
        "GUILDHALL__SERVER__ENVIRONMENT",
        "GUILDHALL__PAYMENT__CURRENCY",
        "GUILDHALL__EMAIL__BATCH_SIZE",
    ];

    fn set_minimal_env() {
        env::set_var(
            "GUILDHALL__AUTH__JWT_SECRET",
            "a-development-secret-of-sufficient-length",
        );
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GUILDHALL__DATABASE__URL", "postgresql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config loads");
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert!(config.database.is_configured());
    }

    #[test]
    fn test_minimal_config_validates_in_development() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(!config.database.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_jwt_secret_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.payment.currency, "NGN");
        assert_eq!(config.email.batch_size, 50);
    }

    #[test]
    fn test_production_requires_database() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GUILDHALL__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        );
    }

    #[test]
    fn test_custom_values_override_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GUILDHALL__SERVER__PORT", "3000");
        env::set_var("GUILDHALL__PAYMENT__CURRENCY", "USD");
        env::set_var("GUILDHALL__EMAIL__BATCH_SIZE", "25");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.payment.currency, "USD");
        assert_eq!(config.email.batch_size, 25);
    }
}
