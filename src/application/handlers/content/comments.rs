//! Comments on approved publications.

use std::sync::Arc;

use serde::Serialize;

use crate::application::handlers::authors::AuthorDirectory;
use crate::application::handlers::notification::Notifier;
use crate::domain::content::Comment;
use crate::domain::foundation::{
    AuthenticatedUser, CommentId, DomainError, OwnedByUser, PublicationId,
};
use crate::domain::notification::NotificationType;
use crate::domain::publication::{AuthorRef, Publication, PublicationStatus};
use crate::ports::{CommentRepository, PublicationRepository};

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: AuthorRef,
}

pub struct CommentsHandler {
    comments: Arc<dyn CommentRepository>,
    publications: Arc<dyn PublicationRepository>,
    authors: AuthorDirectory,
    notifier: Notifier,
}

impl CommentsHandler {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        publications: Arc<dyn PublicationRepository>,
        authors: AuthorDirectory,
        notifier: Notifier,
    ) -> Self {
        Self {
            comments,
            publications,
            authors,
            notifier,
        }
    }

    async fn approved_publication(&self, id: &PublicationId) -> Result<Publication, DomainError> {
        self.publications
            .find_by_id(id)
            .await?
            .filter(|p| p.status == PublicationStatus::Approved)
            .ok_or_else(|| DomainError::not_found("Publication", id))
    }

    /// Oldest first.
    pub async fn list(
        &self,
        publication_id: &PublicationId,
    ) -> Result<Vec<CommentView>, DomainError> {
        self.approved_publication(publication_id).await?;
        let comments = self.comments.list_by_publication(publication_id).await?;
        let known = self.authors.summaries(comments.iter().map(|c| c.author_id)).await;
        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                author: AuthorRef::resolve(comment.author_id, &known),
                comment,
            })
            .collect())
    }

    pub async fn add(
        &self,
        author: &AuthenticatedUser,
        publication_id: &PublicationId,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        let publication = self.approved_publication(publication_id).await?;
        let comment = Comment::new(publication.id, author.id, content)?;
        self.comments.save(&comment).await?;

        if !publication.is_owner(&author.id) {
            let message = format!("{} commented on \"{}\"", author.name, publication.title);
            self.notifier
                .notify(
                    publication.author_id,
                    "New comment",
                    &message,
                    NotificationType::Publication,
                )
                .await;
        }

        let author_ref = self.authors.resolve_one(comment.author_id).await;
        Ok(CommentView {
            comment,
            author: author_ref,
        })
    }

    /// The comment's author or an admin/editor may delete it.
    pub async fn delete(
        &self,
        caller: &AuthenticatedUser,
        id: &CommentId,
    ) -> Result<(), DomainError> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))?;
        comment.check_owner_or_privileged(caller)?;
        self.comments.delete(id).await
    }
}
