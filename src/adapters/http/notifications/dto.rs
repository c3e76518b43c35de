//! Request bodies for inbox and communication endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::foundation::ValidationError;
use crate::domain::notification::{Audience, Recipient};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboxParams {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecipientRequest {
    #[validate(email)]
    pub email: String,
    pub name: Option<String>,
    /// Extra `{{placeholder}}` values for this recipient.
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl RecipientRequest {
    pub fn into_recipient(self) -> Result<Recipient, ValidationError> {
        let mut recipient = Recipient::new(&self.email, self.name)?;
        recipient.fields = self.fields;
        Ok(recipient)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkEmailRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    #[validate(nested)]
    pub recipients: Vec<RecipientRequest>,
    pub audience: Option<Audience>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}
