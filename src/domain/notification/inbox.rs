//! In-app notifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    required_text, NotificationId, OwnedByUser, Timestamp, UserId, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Publication,
    Subscription,
    News,
    Event,
    Forum,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Publication => "publication",
            NotificationType::Subscription => "subscription",
            NotificationType::News => "news",
            NotificationType::Event => "event",
            NotificationType::Forum => "forum",
            NotificationType::System => "system",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publication" => Ok(NotificationType::Publication),
            "subscription" => Ok(NotificationType::Subscription),
            "news" => Ok(NotificationType::News),
            "event" => Ok(NotificationType::Event),
            "forum" => Ok(NotificationType::Forum),
            "system" => Ok(NotificationType::System),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown notification type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub read: bool,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        title: &str,
        message: &str,
        kind: NotificationType,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: NotificationId::new(),
            user_id,
            title: required_text("title", title, 200)?,
            message: required_text("message", message, 2000)?,
            kind,
            read: false,
            created_at: Timestamp::now(),
        })
    }

    /// Returns whether the flag changed.
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }
}

impl OwnedByUser for Notification {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notifications_are_unread() {
        let n = Notification::new(
            UserId::new(),
            "Approved",
            "Your paper is live",
            NotificationType::Publication,
        )
        .unwrap();
        assert!(!n.read);
    }

    #[test]
    fn mark_read_reports_change_once() {
        let mut n = Notification::new(UserId::new(), "T", "M", NotificationType::System).unwrap();
        assert!(n.mark_read());
        assert!(!n.mark_read());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(Notification::new(UserId::new(), " ", "M", NotificationType::News).is_err());
    }
}
