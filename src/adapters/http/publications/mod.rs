//! HTTP adapter for publications, their moderation queue and comments.

mod dto;
mod handlers;
mod routes;

pub use routes::{comment_routes, publication_routes};
