//! Axum routes for notifications and communications.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    delete_notification, list_communications, list_notifications, mark_all_read, mark_read,
    send_bulk_email,
};
use crate::adapters::http::state::AppState;

/// Mounted at `/api/notifications`. Every route acts on the caller's own inbox.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", put(mark_all_read))
        .route("/:id/read", put(mark_read))
        .route("/:id", delete(delete_notification))
}

/// Mounted at `/api/communications` (staff only).
///
/// - `GET /` - sent bulk emails, newest first
/// - `POST /bulk` - send to explicit recipients or an audience
pub fn communication_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_communications))
        .route("/bulk", post(send_bulk_email))
}
