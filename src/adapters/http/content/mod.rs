//! HTTP adapter for news, events and the discussion forum.

mod dto;
mod handlers;
mod routes;

pub use routes::{event_routes, forum_routes, news_routes};
