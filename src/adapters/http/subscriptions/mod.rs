//! HTTP adapter for plans, checkout, verification and the payment webhook.

mod dto;
mod handlers;
mod routes;

pub use routes::{subscription_routes, webhook_routes};
