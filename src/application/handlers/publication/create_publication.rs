//! CreatePublicationHandler - submits a new publication for review.

use std::sync::Arc;

use crate::application::handlers::notification::Notifier;
use crate::domain::foundation::{DomainError, PublicationId, Role, UserId};
use crate::domain::notification::NotificationType;
use crate::domain::publication::{Publication, PublicationFields};
use crate::ports::{PublicationRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct CreatePublicationCommand {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
    /// Keep as a draft instead of submitting for review.
    pub draft: bool,
}

pub struct CreatePublicationHandler {
    publications: Arc<dyn PublicationRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Notifier,
}

impl CreatePublicationHandler {
    pub fn new(
        publications: Arc<dyn PublicationRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Notifier,
    ) -> Self {
        Self {
            publications,
            users,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: CreatePublicationCommand) -> Result<Publication, DomainError> {
        let fields = PublicationFields::new(&cmd.title, &cmd.content, &cmd.category, cmd.image)?;
        let publication =
            Publication::create(PublicationId::new(), cmd.author_id, fields, cmd.draft);
        self.publications.save(&publication).await?;

        tracing::info!(
            publication_id = %publication.id,
            author_id = %publication.author_id,
            status = publication.status.as_str(),
            "publication created"
        );

        if !cmd.draft {
            self.notify_moderators(&publication).await;
        }
        Ok(publication)
    }

    async fn notify_moderators(&self, publication: &Publication) {
        let moderators = match self.users.list_by_roles(&[Role::Admin, Role::Editor]).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "could not load moderators for review notice");
                return;
            }
        };
        let message = format!("\"{}\" is waiting for review", publication.title);
        self.notifier
            .notify_all(
                moderators.into_iter().map(|u| u.id).filter(|id| *id != publication.author_id),
                "New publication submitted",
                &message,
                NotificationType::Publication,
            )
            .await;
    }
}
