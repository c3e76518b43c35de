//! ModeratePublicationHandler - approve or reject a submission.

use std::sync::Arc;

use crate::application::handlers::notification::Notifier;
use crate::domain::foundation::{AuthenticatedUser, DomainError, PublicationId};
use crate::domain::notification::NotificationType;
use crate::domain::publication::{Publication, PublicationStatus};
use crate::ports::PublicationRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationDecision {
    Approve,
    Reject { reason: Option<String> },
}

#[derive(Debug, Clone)]
pub struct ModeratePublicationCommand {
    pub moderator: AuthenticatedUser,
    pub id: PublicationId,
    pub decision: ModerationDecision,
}

pub struct ModeratePublicationHandler {
    publications: Arc<dyn PublicationRepository>,
    notifier: Notifier,
}

impl ModeratePublicationHandler {
    pub fn new(publications: Arc<dyn PublicationRepository>, notifier: Notifier) -> Self {
        Self {
            publications,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: ModeratePublicationCommand,
    ) -> Result<Publication, DomainError> {
        cmd.moderator.require_privileged()?;

        let mut publication = self
            .publications
            .find_by_id(&cmd.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Publication", cmd.id))?;

        match cmd.decision {
            ModerationDecision::Approve => publication.approve()?,
            ModerationDecision::Reject { reason } => publication.reject(reason)?,
        }
        self.publications.update(&publication).await?;

        tracing::info!(
            publication_id = %publication.id,
            moderator_id = %cmd.moderator.id,
            status = publication.status.as_str(),
            "publication moderated"
        );

        let (title, message) = match (&publication.status, &publication.rejection_reason) {
            (PublicationStatus::Approved, _) => (
                "Publication approved",
                format!("\"{}\" is now published", publication.title),
            ),
            (_, Some(reason)) => (
                "Publication rejected",
                format!("\"{}\" was rejected: {}", publication.title, reason),
            ),
            (_, None) => (
                "Publication rejected",
                format!("\"{}\" was rejected", publication.title),
            ),
        };
        self.notifier
            .notify(
                publication.author_id,
                title,
                &message,
                NotificationType::Publication,
            )
            .await;

        Ok(publication)
    }
}
