//! Best-effort in-app notifications.
//!
//! Used by other handlers after their primary write has succeeded. Failures
//! are logged at `warn` and never surface to the caller.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::notification::{Notification, NotificationType};
use crate::ports::NotificationRepository;

#[derive(Clone)]
pub struct Notifier {
    notifications: Arc<dyn NotificationRepository>,
}

impl Notifier {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Creates a notification. Returns it when stored, `None` otherwise.
    pub async fn notify(
        &self,
        user_id: UserId,
        title: &str,
        message: &str,
        kind: NotificationType,
    ) -> Option<Notification> {
        let notification = match Notification::new(user_id, title, message, kind) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    kind = %kind,
                    error = %e,
                    "notification rejected"
                );
                return None;
            }
        };
        match self.notifications.save(&notification).await {
            Ok(()) => Some(notification),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    kind = %kind,
                    error = %e,
                    "failed to store notification"
                );
                None
            }
        }
    }

    /// Notifies every user in `recipients`, skipping failures.
    pub async fn notify_all(
        &self,
        recipients: impl IntoIterator<Item = UserId>,
        title: &str,
        message: &str,
        kind: NotificationType,
    ) -> usize {
        let mut stored = 0;
        for user_id in recipients {
            if self.notify(user_id, title, message, kind).await.is_some() {
                stored += 1;
            }
        }
        stored
    }
}
