//! Publication repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Page, Paginated, PublicationId, UserId};
use crate::domain::publication::{Publication, PublicationStatus};

/// Filters for the public listing of approved publications.
#[derive(Debug, Clone, Default)]
pub struct PublicationQuery {
    /// Case-insensitive substring match over title and content.
    pub search: Option<String>,
    /// Exact category match, case-insensitive.
    pub category: Option<String>,
    pub page: Page,
}

#[async_trait]
pub trait PublicationRepository: Send + Sync {
    async fn save(&self, publication: &Publication) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if the publication doesn't exist
    async fn update(&self, publication: &Publication) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if the publication doesn't exist
    async fn delete(&self, id: &PublicationId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &PublicationId) -> Result<Option<Publication>, DomainError>;

    /// Approved publications matching the query, newest first.
    async fn list_approved(
        &self,
        query: &PublicationQuery,
    ) -> Result<Paginated<Publication>, DomainError>;

    /// An author's publications, newest first, optionally one status only.
    async fn list_by_author(
        &self,
        author: &UserId,
        status: Option<PublicationStatus>,
    ) -> Result<Vec<Publication>, DomainError>;

    /// All publications in a status, oldest first.
    async fn list_by_status(
        &self,
        status: PublicationStatus,
    ) -> Result<Vec<Publication>, DomainError>;
}
