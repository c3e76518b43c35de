//! Axum routes for auth and user endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{delete_user, list_users, login, me, register, update_me, update_role};
use crate::adapters::http::state::AppState;

/// Mounted at `/api/auth`.
///
/// - `POST /register` - create a member account, returns a bearer token
/// - `POST /login` - exchange email and password for a bearer token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Mounted at `/api/users`.
///
/// - `GET /me`, `PUT /me` - the caller's own account
/// - `GET /` - all users (admin)
/// - `PUT /:id/role` - change a role (admin, never one's own)
/// - `DELETE /:id` - remove an account (admin, never one's own)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me).put(update_me))
        .route("/:id/role", put(update_role))
        .route("/:id", axum::routing::delete(delete_user))
}
