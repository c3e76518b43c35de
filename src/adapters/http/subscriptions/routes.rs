//! Axum routes for subscriptions and gateway webhooks.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    cancel, create_plan, deactivate_plan, history, initialize, list_all_plans, list_plans,
    payment_webhook, status, update_plan, verify_payment, verify_payment_redirect,
};
use crate::adapters::http::state::AppState;

/// Mounted at `/api/subscriptions`.
///
/// - `GET /plans` - active plans (public)
/// - `GET /plans/all`, `POST /plans`, `PUT|DELETE /plans/:id` - catalogue (admin)
/// - `POST /initialize` - free subscription or paid checkout link
/// - `POST /verify`, `GET /verify?transaction_id=` - confirm a gateway transaction
/// - `GET /status`, `POST /cancel`, `GET /history`
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/all", get(list_all_plans))
        .route("/plans/:id", put(update_plan).delete(deactivate_plan))
        .route("/initialize", post(initialize))
        .route("/verify", post(verify_payment).get(verify_payment_redirect))
        .route("/status", get(status))
        .route("/cancel", post(cancel))
        .route("/history", get(history))
}

/// Mounted at `/api/webhooks`. No bearer auth; the shared secret header
/// authenticates the gateway.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payments", post(payment_webhook))
}
