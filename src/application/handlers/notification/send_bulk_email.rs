//! Bulk email to an explicit recipient list or a member audience.
//!
//! Recipients are sent in fixed-size batches with a pause between batches to
//! stay under provider rate limits. Each recipient gets its own rendering of
//! the `{{placeholder}}` template. One failed address never aborts the run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{AuthenticatedUser, DomainError, Role, Timestamp};
use crate::domain::notification::template::{render, render_html};
use crate::domain::notification::{
    Audience, CommunicationRecord, Message, Recipient, RecipientResult,
};
use crate::domain::user::User;
use crate::ports::{
    CommunicationRepository, EmailMessage, EmailSender, SubscriptionRepository, UserRepository,
};

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
pub struct BulkEmailSettings {
    batch_size: usize,
    batch_delay: Duration,
}

impl BulkEmailSettings {
    pub fn new(batch_size: usize, batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for BulkEmailSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY)
    }
}

#[derive(Debug, Clone)]
pub struct SendBulkEmailCommand {
    pub sender: AuthenticatedUser,
    pub subject: String,
    pub content: String,
    /// Explicit recipients. Takes precedence over `audience`.
    pub recipients: Vec<Recipient>,
    pub audience: Option<Audience>,
}

pub struct SendBulkEmailHandler {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    email: Arc<dyn EmailSender>,
    communications: Arc<dyn CommunicationRepository>,
    settings: BulkEmailSettings,
}

impl SendBulkEmailHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        email: Arc<dyn EmailSender>,
        communications: Arc<dyn CommunicationRepository>,
        settings: BulkEmailSettings,
    ) -> Self {
        Self {
            users,
            subscriptions,
            email,
            communications,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendBulkEmailCommand,
    ) -> Result<CommunicationRecord, DomainError> {
        cmd.sender.require_privileged()?;
        let message = Message::new(&cmd.subject, &cmd.content)?;

        let recipients = if cmd.recipients.is_empty() {
            match cmd.audience {
                Some(audience) => self.audience_recipients(audience).await?,
                None => {
                    return Err(DomainError::validation(
                        "recipients",
                        "Provide recipients or an audience",
                    ))
                }
            }
        } else {
            cmd.recipients
        };
        let recipients = dedupe(recipients);
        if recipients.is_empty() {
            return Err(DomainError::validation("recipients", "No recipients to send to"));
        }

        tracing::info!(
            sender = %cmd.sender.id,
            recipients = recipients.len(),
            batch_size = self.settings.batch_size,
            "sending bulk email"
        );

        let mut results = Vec::with_capacity(recipients.len());
        for (index, batch) in recipients.chunks(self.settings.batch_size).enumerate() {
            if index > 0 && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
            for recipient in batch {
                results.push(self.send_one(&message, recipient).await);
            }
        }

        let record = CommunicationRecord::from_results(cmd.sender.id, message, results);
        self.communications.save(&record).await?;
        tracing::info!(
            communication_id = %record.id,
            sent = record.sent_count,
            failed = record.failed_count,
            "bulk email finished"
        );
        Ok(record)
    }

    async fn send_one(&self, message: &Message, recipient: &Recipient) -> RecipientResult {
        let vars = recipient.template_vars();
        let email = EmailMessage {
            to: recipient.email.clone(),
            subject: render(&message.subject, &vars),
            html: render_html(&message.content, &vars),
            text: None,
        };
        match self.email.send(&email).await {
            Ok(_) => RecipientResult::sent(&recipient.email),
            Err(e) => {
                tracing::warn!(to = %recipient.email, error = %e, "bulk email recipient failed");
                RecipientResult::failed(&recipient.email, e.to_string())
            }
        }
    }

    async fn audience_recipients(&self, audience: Audience) -> Result<Vec<Recipient>, DomainError> {
        let users = match audience {
            Audience::All => {
                self.users
                    .list_by_roles(&[Role::Admin, Role::Editor, Role::Member])
                    .await?
            }
            Audience::Members => self.users.list_by_roles(&[Role::Member]).await?,
            Audience::Subscribers => {
                let ids = self
                    .subscriptions
                    .list_active_user_ids(Timestamp::now())
                    .await?;
                self.users.find_by_ids(&ids).await?
            }
        };
        Ok(users.into_iter().map(recipient_for).collect())
    }
}

fn recipient_for(user: User) -> Recipient {
    Recipient {
        email: user.email,
        name: Some(user.name),
        fields: HashMap::new(),
    }
}

/// Keeps the first occurrence of each address, ignoring case.
fn dedupe(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    recipients
        .into_iter()
        .filter(|r| seen.insert(r.email.trim().to_ascii_lowercase()))
        .collect()
}

pub struct ListCommunicationsHandler {
    communications: Arc<dyn CommunicationRepository>,
}

impl ListCommunicationsHandler {
    pub fn new(communications: Arc<dyn CommunicationRepository>) -> Self {
        Self { communications }
    }

    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        limit: u32,
    ) -> Result<Vec<CommunicationRecord>, DomainError> {
        actor.require_privileged()?;
        self.communications.list(limit.clamp(1, 200)).await
    }
}
