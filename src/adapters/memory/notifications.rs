use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::missing;
use crate::domain::foundation::{CommunicationId, DomainError, NotificationId, UserId};
use crate::domain::notification::{CommunicationRecord, Notification};
use crate::ports::{CommunicationRepository, NotificationRepository};

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn save(&self, notification: &Notification) -> Result<(), DomainError> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<(), DomainError> {
        match self.notifications.write().await.get_mut(&notification.id) {
            Some(stored) => {
                *stored = notification.clone();
                Ok(())
            }
            None => Err(missing("Notification", notification.id)),
        }
    }

    async fn delete(&self, id: &NotificationId) -> Result<(), DomainError> {
        self.notifications
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("Notification", id))
    }

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError> {
        Ok(self.notifications.read().await.get(id).cloned())
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        let mut mine: Vec<Notification> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| &n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let mut changed = 0;
        for notification in self.notifications.write().await.values_mut() {
            if &notification.user_id == user_id && notification.mark_read() {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[derive(Default)]
pub struct InMemoryCommunicationRepository {
    records: RwLock<Vec<CommunicationRecord>>,
}

impl InMemoryCommunicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommunicationRepository for InMemoryCommunicationRepository {
    async fn save(&self, record: &CommunicationRecord) -> Result<(), DomainError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CommunicationId,
    ) -> Result<Option<CommunicationRecord>, DomainError> {
        Ok(self.records.read().await.iter().find(|r| &r.id == id).cloned())
    }

    async fn list(&self, limit: u32) -> Result<Vec<CommunicationRecord>, DomainError> {
        let mut all = self.records.read().await.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit as usize);
        Ok(all)
    }
}
