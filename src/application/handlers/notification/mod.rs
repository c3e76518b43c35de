//! Notification and communication handlers.

mod manage_notifications;
mod notifier;
mod send_bulk_email;

pub use manage_notifications::NotificationInboxHandler;
pub use notifier::Notifier;
pub use send_bulk_email::{
    BulkEmailSettings, ListCommunicationsHandler, SendBulkEmailCommand, SendBulkEmailHandler,
};
