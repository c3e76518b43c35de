//! HTTP handlers for subscription endpoints and the payment webhook.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use validator::Validate;

use super::dto::{
    CreatePlanRequest, InitializeRequest, InitializeResponse, UpdatePlanRequest, VerifyRequest,
    VerifyResponse, WebhookResponse,
};
use crate::adapters::http::error::{parse_id, ApiError};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::subscription::{
    CreatePlanCommand, HandlePaymentWebhookCommand, InitializePaymentCommand, UpdatePlanCommand,
    VerifyPaymentCommand,
};
use crate::domain::foundation::{AuthenticatedUser, PlanId};
use crate::domain::subscription::WEBHOOK_SECRET_HEADER;

/// GET /api/subscriptions/plans - active plans
pub async fn list_plans(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.plans_handler().list_active().await?))
}

/// GET /api/subscriptions/plans/all - every plan, including inactive (admin)
pub async fn list_all_plans(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.plans_handler().list_all(&user).await?))
}

/// POST /api/subscriptions/plans (admin)
pub async fn create_plan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<CreatePlanRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let cmd = CreatePlanCommand {
        price_minor: request.price_minor(),
        name: request.name,
        gateway_plan_id: request.gateway_plan_id,
        currency: request.currency,
        interval: request.interval,
        features: request.features,
    };
    let plan = state.plans_handler().create(&user, cmd).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /api/subscriptions/plans/:id (admin)
pub async fn update_plan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePlanRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PlanId = parse_id("Plan", &id)?;
    let Json(request) = payload?;
    request.validate()?;

    let plan = state
        .plans_handler()
        .update(
            &user,
            UpdatePlanCommand {
                id,
                edit: request.into(),
            },
        )
        .await?;
    Ok(Json(plan))
}

/// DELETE /api/subscriptions/plans/:id - deactivates, never removes (admin)
pub async fn deactivate_plan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PlanId = parse_id("Plan", &id)?;
    Ok(Json(state.plans_handler().deactivate(&user, &id).await?))
}

/// POST /api/subscriptions/initialize
pub async fn initialize(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<InitializeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let result = state
        .initialize_payment_handler()
        .handle(InitializePaymentCommand {
            user_id: user.id,
            tier: request.tier,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(InitializeResponse::from(result))))
}

async fn verify(
    state: &AppState,
    user: AuthenticatedUser,
    request: VerifyRequest,
) -> Result<Json<VerifyResponse>, ApiError> {
    request.validate()?;
    let outcome = state
        .verify_payment_handler()
        .handle(VerifyPaymentCommand {
            user_id: user.id,
            transaction_id: request.transaction_id,
            reference: request.reference,
        })
        .await?;
    Ok(Json(VerifyResponse::from(outcome)))
}

/// POST /api/subscriptions/verify
pub async fn verify_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    verify(&state, user, request).await
}

/// GET /api/subscriptions/verify?transaction_id= - gateway redirect target
pub async fn verify_payment_redirect(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    params: Result<Query<VerifyRequest>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(request) = params?;
    verify(&state, user, request).await
}

/// GET /api/subscriptions/status
pub async fn status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.subscription_status_handler().handle(&user.id).await?))
}

/// POST /api/subscriptions/cancel
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.cancel_subscription_handler().handle(&user.id).await?))
}

/// GET /api/subscriptions/history
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.payment_history_handler().handle(&user.id).await?))
}

/// POST /api/webhooks/payments - authenticated by the `verif-hash` header
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let secret = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            secret,
        })
        .await?;
    Ok(Json(WebhookResponse::from(outcome)))
}
