//! Notification module - in-app notifications and bulk email communications.

mod communication;
mod inbox;
pub mod template;

pub use communication::{
    Audience, CommunicationRecord, DeliveryStatus, Message, Recipient, RecipientResult,
    SendOutcome,
};
pub use inbox::{Notification, NotificationType};
