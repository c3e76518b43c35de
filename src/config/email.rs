//! Email provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::email::RESEND_BASE_URL;

/// Email configuration (Resend-compatible API)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_from_email")]
    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Recipients per bulk batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between bulk batches in milliseconds
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
}

impl EmailConfig {
    /// Formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if production && self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__API_KEY"));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if self.batch_size == 0 || self.batch_size > 500 {
            return Err(ValidationError::InvalidBatchSize);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay(),
        }
    }
}

fn default_base_url() -> String {
    RESEND_BASE_URL.to_string()
}

fn default_from_email() -> String {
    "noreply@guildhall.org".to_string()
}

fn default_from_name() -> String {
    "Guildhall".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_batch_delay() -> u64 {
    1000
}
