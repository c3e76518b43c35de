//! HTTP adapters - REST API implementations.
//!
//! Each area has its own router module; `app` mounts them all under `/api`
//! behind the bearer-token middleware and the tower-http layers.

pub mod content;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod publications;
pub mod state;
pub mod subscriptions;
pub mod users;

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use middleware::{auth_middleware, OptionalAuth, RequireAuth};
pub use state::{AppSettings, AppState, Repositories};

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Exact origins allowed by CORS. Empty means same-origin only.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every `/api` route, without the outer layers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", users::auth_routes())
        .nest("/users", users::user_routes())
        .nest("/publications", publications::publication_routes())
        .nest("/comments", publications::comment_routes())
        .nest("/news", content::news_routes())
        .nest("/events", content::event_routes())
        .nest("/forum", content::forum_routes())
        .nest("/subscriptions", subscriptions::subscription_routes())
        .nest("/webhooks", subscriptions::webhook_routes())
        .nest("/notifications", notifications::notification_routes())
        .nest("/communications", notifications::communication_routes())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// The complete application: `/api` routes, bearer auth, tracing, CORS and
/// the request timeout.
pub fn app(state: AppState, options: &HttpOptions) -> Router {
    let auth = axum::middleware::from_fn_with_state(state.sessions.clone(), auth_middleware);

    Router::new()
        .nest("/api", api_routes())
        .layer(auth)
        .with_state(state)
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
}
