//! Axum routes for publications and comments.

use axum::{
    routing::{delete, get, put},
    Router,
};

use super::handlers::{
    add_comment, approve_publication, create_publication, delete_comment, delete_publication,
    get_publication, list_comments, list_mine, list_pending, list_publications,
    reject_publication, update_publication,
};
use crate::adapters::http::state::AppState;

/// Mounted at `/api/publications`.
///
/// ## Public
/// - `GET /` - approved publications (`search`, `category`, `page`, `limit`)
/// - `GET /:id` - one publication; non-approved ones only for author and staff
/// - `GET /:id/comments`
///
/// ## Authenticated
/// - `POST /`, `PUT /:id`, `DELETE /:id`
/// - `GET /mine`
/// - `POST /:id/comments`
///
/// ## Staff
/// - `GET /pending`, `PUT /:id/approve`, `PUT /:id/reject`
pub fn publication_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_publications).post(create_publication))
        .route("/mine", get(list_mine))
        .route("/pending", get(list_pending))
        .route(
            "/:id",
            get(get_publication)
                .put(update_publication)
                .delete(delete_publication),
        )
        .route("/:id/approve", put(approve_publication))
        .route("/:id/reject", put(reject_publication))
        .route("/:id/comments", get(list_comments).post(add_comment))
}

/// Mounted at `/api/comments`.
pub fn comment_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_comment))
}
