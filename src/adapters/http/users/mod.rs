//! HTTP adapter for registration, login and user management.

mod dto;
mod handlers;
mod routes;

pub use dto::{AuthResponse, UserResponse};
pub use routes::{auth_routes, user_routes};
