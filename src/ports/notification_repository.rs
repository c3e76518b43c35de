//! Notification and communication history ports.

use async_trait::async_trait;

use crate::domain::foundation::{CommunicationId, DomainError, NotificationId, UserId};
use crate::domain::notification::{CommunicationRecord, Notification};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn save(&self, notification: &Notification) -> Result<(), DomainError>;

    async fn update(&self, notification: &Notification) -> Result<(), DomainError>;

    async fn delete(&self, id: &NotificationId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError>;

    /// Newest first.
    async fn list_by_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError>;

    /// Returns how many notifications changed.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, DomainError>;
}

#[async_trait]
pub trait CommunicationRepository: Send + Sync {
    async fn save(&self, record: &CommunicationRecord) -> Result<(), DomainError>;

    async fn find_by_id(
        &self,
        id: &CommunicationId,
    ) -> Result<Option<CommunicationRecord>, DomainError>;

    /// Newest first, at most `limit` records.
    async fn list(&self, limit: u32) -> Result<Vec<CommunicationRecord>, DomainError>;
}
