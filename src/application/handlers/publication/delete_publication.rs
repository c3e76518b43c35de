//! DeletePublicationHandler - author removal of an unapproved publication.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, PublicationId, UserId};
use crate::ports::{CommentRepository, PublicationRepository};

#[derive(Debug, Clone)]
pub struct DeletePublicationCommand {
    pub id: PublicationId,
    pub user_id: UserId,
}

pub struct DeletePublicationHandler {
    publications: Arc<dyn PublicationRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl DeletePublicationHandler {
    pub fn new(
        publications: Arc<dyn PublicationRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            publications,
            comments,
        }
    }

    /// Deletes the publication together with its comments.
    pub async fn handle(&self, cmd: DeletePublicationCommand) -> Result<(), DomainError> {
        let publication = self
            .publications
            .find_by_id(&cmd.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Publication", cmd.id))?;
        publication.check_deletable_by(&cmd.user_id)?;

        let removed = self.comments.delete_by_publication(&publication.id).await?;
        self.publications.delete(&publication.id).await?;

        tracing::info!(
            publication_id = %publication.id,
            comments_removed = removed,
            "publication deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::publication::test_support::Stores;
    use crate::domain::content::Comment;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::publication::PublicationStatus;

    fn handler(stores: &Stores) -> DeletePublicationHandler {
        DeletePublicationHandler::new(stores.publications.clone(), stores.comments.clone())
    }

    #[tokio::test]
    async fn author_deletes_pending_publication_and_comments() {
        let stores = Stores::new();
        let author = UserId::new();
        let publication = stores.publication(author, PublicationStatus::Pending).await;
        let comment = Comment::new(publication.id, UserId::new(), "Nice").unwrap();
        stores.comments.save(&comment).await.unwrap();

        handler(&stores)
            .handle(DeletePublicationCommand {
                id: publication.id,
                user_id: author,
            })
            .await
            .unwrap();

        assert!(stores.publications.find_by_id(&publication.id).await.unwrap().is_none());
        assert!(stores.comments.find_by_id(&comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn approved_publication_cannot_be_deleted_by_author() {
        let stores = Stores::new();
        let author = UserId::new();
        let publication = stores.publication(author, PublicationStatus::Approved).await;

        let err = handler(&stores)
            .handle(DeletePublicationCommand {
                id: publication.id,
                user_id: author,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(stores.publications.find_by_id(&publication.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn other_users_cannot_delete() {
        let stores = Stores::new();
        let publication = stores.publication(UserId::new(), PublicationStatus::Draft).await;

        let err = handler(&stores)
            .handle(DeletePublicationCommand {
                id: publication.id,
                user_id: UserId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
