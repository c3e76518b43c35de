//! Bulk email communications and their delivery record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{
    required_text, CommunicationId, Timestamp, UserId, ValidationError,
};
use crate::domain::user::normalize_email;

/// One addressee with personalization data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl Recipient {
    pub fn new(email: &str, name: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            email: normalize_email(email)?,
            name,
            fields: HashMap::new(),
        })
    }

    /// Variables available to `{{placeholder}}` substitution. Custom fields
    /// never shadow `name` and `email`.
    pub fn template_vars(&self) -> HashMap<String, String> {
        let mut vars = self.fields.clone();
        vars.insert("email".to_string(), self.email.clone());
        vars.insert("name".to_string(), self.name.clone().unwrap_or_default());
        vars
    }
}

/// Who a bulk send goes to when no explicit list is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    All,
    Members,
    Subscribers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendOutcome {
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientResult {
    pub email: String,
    pub status: SendOutcome,
    pub error: Option<String>,
}

impl RecipientResult {
    pub fn sent(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: SendOutcome::Sent,
            error: None,
        }
    }

    pub fn failed(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: SendOutcome::Failed,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// At least one recipient was sent the message.
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "delivered" => Ok(DeliveryStatus::Delivered),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "delivery_status",
                format!("unknown delivery status '{}'", other),
            )),
        }
    }
}

/// Validated subject and body of a bulk email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub content: String,
}

impl Message {
    pub fn new(subject: &str, content: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            subject: required_text("subject", subject, 300)?,
            content: required_text("content", content, 200_000)?,
        })
    }
}

/// Aggregate outcome of one bulk send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationRecord {
    pub id: CommunicationId,
    pub sender_id: UserId,
    pub subject: String,
    pub content: String,
    pub recipient_count: u32,
    pub results: Vec<RecipientResult>,
    pub delivery_status: DeliveryStatus,
    pub sent_count: u32,
    pub failed_count: u32,
    pub created_at: Timestamp,
}

impl CommunicationRecord {
    pub fn from_results(
        sender_id: UserId,
        message: Message,
        results: Vec<RecipientResult>,
    ) -> Self {
        let sent_count = results
            .iter()
            .filter(|r| r.status == SendOutcome::Sent)
            .count() as u32;
        let recipient_count = results.len() as u32;
        Self {
            id: CommunicationId::new(),
            sender_id,
            subject: message.subject,
            content: message.content,
            recipient_count,
            delivery_status: if sent_count > 0 {
                DeliveryStatus::Delivered
            } else {
                DeliveryStatus::Failed
            },
            sent_count,
            failed_count: recipient_count - sent_count,
            results,
            created_at: Timestamp::now(),
        }
    }
}
