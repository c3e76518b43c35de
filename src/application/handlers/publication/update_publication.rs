//! UpdatePublicationHandler - author edit that resubmits for review.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, PublicationId, UserId};
use crate::domain::publication::{Publication, PublicationFields};
use crate::ports::PublicationRepository;

#[derive(Debug, Clone)]
pub struct UpdatePublicationCommand {
    pub id: PublicationId,
    pub editor_id: UserId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
}

pub struct UpdatePublicationHandler {
    publications: Arc<dyn PublicationRepository>,
}

impl UpdatePublicationHandler {
    pub fn new(publications: Arc<dyn PublicationRepository>) -> Self {
        Self { publications }
    }

    pub async fn handle(&self, cmd: UpdatePublicationCommand) -> Result<Publication, DomainError> {
        let mut publication = self
            .publications
            .find_by_id(&cmd.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Publication", cmd.id))?;

        let fields = PublicationFields::new(&cmd.title, &cmd.content, &cmd.category, cmd.image)?;
        publication.revise(&cmd.editor_id, fields)?;
        self.publications.update(&publication).await?;

        tracing::info!(publication_id = %publication.id, "publication revised and resubmitted");
        Ok(publication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::publication::test_support::Stores;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::publication::PublicationStatus;

    fn command(id: PublicationId, editor_id: UserId) -> UpdatePublicationCommand {
        UpdatePublicationCommand {
            id,
            editor_id,
            title: "Revised notes".into(),
            content: "New body".into(),
            category: "research".into(),
            image: Some("https://img.example.org/a.png".into()),
        }
    }

    #[tokio::test]
    async fn rejected_publication_goes_back_to_pending() {
        let stores = Stores::new();
        let author = UserId::new();
        let mut original = stores.publication(author, PublicationStatus::Pending).await;
        original.reject(Some("Needs sources".into())).unwrap();
        stores.publications.update(&original).await.unwrap();

        let handler = UpdatePublicationHandler::new(stores.publications.clone());
        let revised = handler.handle(command(original.id, author)).await.unwrap();

        assert_eq!(revised.status, PublicationStatus::Pending);
        assert_eq!(revised.title, "Revised notes");
        assert!(revised.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn approved_publication_is_frozen_for_author() {
        let stores = Stores::new();
        let author = UserId::new();
        let approved = stores.publication(author, PublicationStatus::Approved).await;

        let handler = UpdatePublicationHandler::new(stores.publications.clone());
        let err = handler.handle(command(approved.id, author)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn only_the_author_may_edit() {
        let stores = Stores::new();
        let pending = stores.publication(UserId::new(), PublicationStatus::Pending).await;

        let handler = UpdatePublicationHandler::new(stores.publications.clone());
        let err = handler
            .handle(command(pending.id, UserId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_publication_is_not_found() {
        let stores = Stores::new();
        let handler = UpdatePublicationHandler::new(stores.publications.clone());
        let err = handler
            .handle(command(PublicationId::new(), UserId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
