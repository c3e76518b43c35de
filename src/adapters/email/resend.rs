//! Resend REST adapter for `EmailSender`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::ports::{EmailError, EmailMessage, EmailReceipt, EmailSender};

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Clone)]
pub struct ResendConfig {
    api_key: SecretString,
    from: String,
    base_url: String,
}

impl ResendConfig {
    /// `from` is a full header value such as `Guildhall <noreply@guildhall.org>`.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

pub struct ResendEmailSender {
    config: ResendConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendEmailSender {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn body(&self, message: &EmailMessage) -> serde_json::Value {
        let mut body = json!({
            "from": self.config.from,
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });
        if let Some(text) = &message.text {
            body["text"] = json!(text);
        }
        body
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let response = self
            .http_client
            .post(format!("{}/emails", self.config.base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.body(message))
            .send()
            .await
            .map_err(|e| EmailError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                to = %message.to,
                http_status = status.as_u16(),
                error = %error_text,
                "email rejected"
            );
            if status.is_server_error() {
                return Err(EmailError::Network(error_text));
            }
            return Err(EmailError::Rejected(error_text));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| EmailError::Network(format!("Failed to parse response: {}", e)))?;
        tracing::debug!(to = %message.to, id = %sent.id, "email sent");
        Ok(EmailReceipt { id: sent.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_from_header_and_single_recipient() {
        let sender = ResendEmailSender::new(ResendConfig::new(
            "re_x",
            "Guildhall <noreply@guildhall.org>",
        ));
        let body = sender.body(&EmailMessage {
            to: "ada@example.org".into(),
            subject: "Hi".into(),
            html: "<p>Hi</p>".into(),
            text: None,
        });
        assert_eq!(body["from"], "Guildhall <noreply@guildhall.org>");
        assert_eq!(body["to"], json!(["ada@example.org"]));
        assert!(body.get("text").is_none());
    }

    #[tokio::test]
    async fn empty_key_is_not_configured() {
        let sender = ResendEmailSender::new(ResendConfig::new("", "x <a@b.c>"));
        let err = sender
            .send(&EmailMessage {
                to: "a@b.c".into(),
                subject: "s".into(),
                html: "h".into(),
                text: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, EmailError::NotConfigured);
    }
}
