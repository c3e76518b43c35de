//! HTTP adapter for the notification inbox and bulk communications.

mod dto;
mod handlers;
mod routes;

pub use routes::{communication_routes, notification_routes};
