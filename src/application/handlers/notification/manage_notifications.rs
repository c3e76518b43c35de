//! Inbox operations on the caller's own notifications.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, NotificationId, OwnedByUser, UserId};
use crate::domain::notification::Notification;
use crate::ports::NotificationRepository;

pub struct NotificationInboxHandler {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationInboxHandler {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    pub async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        self.notifications.list_by_user(user_id, unread_only).await
    }

    async fn load_owned(
        &self,
        id: &NotificationId,
        user_id: &UserId,
    ) -> Result<Notification, DomainError> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", id))?;
        notification.check_ownership(user_id)?;
        Ok(notification)
    }

    pub async fn mark_read(
        &self,
        id: &NotificationId,
        user_id: &UserId,
    ) -> Result<Notification, DomainError> {
        let mut notification = self.load_owned(id, user_id).await?;
        if notification.mark_read() {
            self.notifications.update(&notification).await?;
        }
        Ok(notification)
    }

    /// Returns how many notifications changed.
    pub async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, DomainError> {
        self.notifications.mark_all_read(user_id).await
    }

    pub async fn delete(&self, id: &NotificationId, user_id: &UserId) -> Result<(), DomainError> {
        self.load_owned(id, user_id).await?;
        self.notifications.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryNotificationRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::notification::NotificationType;

    async fn setup() -> (
        NotificationInboxHandler,
        Arc<InMemoryNotificationRepository>,
        Notification,
    ) {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let notification = Notification::new(
            UserId::new(),
            "Hello",
            "Welcome aboard",
            NotificationType::System,
        )
        .unwrap();
        repo.save(&notification).await.unwrap();
        (NotificationInboxHandler::new(repo.clone()), repo, notification)
    }

    #[tokio::test]
    async fn owner_marks_notification_read() {
        let (handler, _, n) = setup().await;
        let updated = handler.mark_read(&n.id, &n.user_id).await.unwrap();
        assert!(updated.read);
        assert!(handler.list(&n.user_id, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_notification_is_forbidden() {
        let (handler, _, n) = setup().await;
        let err = handler.mark_read(&n.id, &UserId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = handler.delete(&n.id, &UserId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_notification_is_not_found() {
        let (handler, _, n) = setup().await;
        let err = handler
            .mark_read(&NotificationId::new(), &n.user_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn mark_all_read_counts_changes() {
        let (handler, repo, n) = setup().await;
        let second =
            Notification::new(n.user_id, "Again", "Second one", NotificationType::News).unwrap();
        repo.save(&second).await.unwrap();

        assert_eq!(handler.mark_all_read(&n.user_id).await.unwrap(), 2);
        assert_eq!(handler.mark_all_read(&n.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn owner_deletes_notification() {
        let (handler, _, n) = setup().await;
        handler.delete(&n.id, &n.user_id).await.unwrap();
        assert!(handler.list(&n.user_id, false).await.unwrap().is_empty());
    }
}
