//! Axum routes for community content.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    create_event, create_news, delete_event, delete_news, delete_reply, delete_thread,
    edit_thread, get_event, get_news, get_thread, list_events, list_news, list_threads,
    lock_thread, pin_thread, register_for_event, reply, start_thread, unregister_from_event,
    update_event, update_news,
};
use crate::adapters::http::state::AppState;

/// Mounted at `/api/news`. Reads are public, writes are staff-only.
pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_news).post(create_news))
        .route("/:id", get(get_news).put(update_news).delete(delete_news))
}

/// Mounted at `/api/events`.
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event).put(update_event).delete(delete_event))
        .route(
            "/:id/register",
            post(register_for_event).delete(unregister_from_event),
        )
}

/// Mounted at `/api/forum`.
///
/// - `GET|POST /threads`, `GET|PUT|DELETE /threads/:id`
/// - `POST /threads/:id/replies` - refused on locked threads
/// - `PUT /threads/:id/pin`, `PUT /threads/:id/lock` - staff
/// - `DELETE /replies/:id`
pub fn forum_routes() -> Router<AppState> {
    Router::new()
        .route("/threads", get(list_threads).post(start_thread))
        .route(
            "/threads/:id",
            get(get_thread).put(edit_thread).delete(delete_thread),
        )
        .route("/threads/:id/replies", post(reply))
        .route("/threads/:id/pin", put(pin_thread))
        .route("/threads/:id/lock", put(lock_thread))
        .route("/replies/:id", delete(delete_reply))
}
