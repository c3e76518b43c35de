//! Read side of the publication lifecycle.

use std::sync::Arc;

use serde::Serialize;

use crate::application::handlers::authors::AuthorDirectory;
use crate::domain::foundation::{AuthenticatedUser, DomainError, Paginated, PublicationId, UserId};
use crate::domain::publication::{AuthorRef, Publication, PublicationStatus};
use crate::ports::{PublicationQuery, PublicationRepository};

/// Publication with its author populated.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationView {
    #[serde(flatten)]
    pub publication: Publication,
    pub author: AuthorRef,
}

pub struct PublicationQueryHandler {
    publications: Arc<dyn PublicationRepository>,
    authors: AuthorDirectory,
}

impl PublicationQueryHandler {
    pub fn new(publications: Arc<dyn PublicationRepository>, authors: AuthorDirectory) -> Self {
        Self {
            publications,
            authors,
        }
    }

    async fn with_authors(&self, publications: Vec<Publication>) -> Vec<PublicationView> {
        let known = self
            .authors
            .summaries(publications.iter().map(|p| p.author_id))
            .await;
        publications
            .into_iter()
            .map(|publication| PublicationView {
                author: AuthorRef::resolve(publication.author_id, &known),
                publication,
            })
            .collect()
    }

    /// Public listing of approved publications.
    pub async fn list_approved(
        &self,
        query: &PublicationQuery,
    ) -> Result<Paginated<PublicationView>, DomainError> {
        let page = self.publications.list_approved(query).await?;
        let Paginated {
            items,
            total,
            page: number,
            limit,
        } = page;
        Ok(Paginated {
            items: self.with_authors(items).await,
            total,
            page: number,
            limit,
        })
    }

    pub async fn list_mine(
        &self,
        author_id: &UserId,
        status: Option<PublicationStatus>,
    ) -> Result<Vec<Publication>, DomainError> {
        self.publications.list_by_author(author_id, status).await
    }

    /// Moderation queue, oldest first.
    pub async fn list_pending(
        &self,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<PublicationView>, DomainError> {
        actor.require_privileged()?;
        let pending = self
            .publications
            .list_by_status(PublicationStatus::Pending)
            .await?;
        Ok(self.with_authors(pending).await)
    }

    pub async fn get_one(
        &self,
        id: &PublicationId,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<PublicationView, DomainError> {
        let publication = self
            .publications
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Publication", id))?;
        publication.check_visible_to(viewer)?;

        let author = self.authors.resolve_one(publication.author_id).await;
        Ok(PublicationView {
            publication,
            author,
        })
    }
}
