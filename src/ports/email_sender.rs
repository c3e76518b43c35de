//! Outbound transactional email port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

/// Provider-assigned message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    /// The provider refused the message (bad address, suppressed, quota).
    #[error("Email rejected: {0}")]
    Rejected(String),

    #[error("Email provider unreachable: {0}")]
    Network(String),

    #[error("Email provider is not configured")]
    NotConfigured,
}
