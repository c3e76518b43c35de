//! HTTP handlers for the inbox and bulk communications.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use validator::Validate;

use super::dto::{BulkEmailRequest, HistoryParams, InboxParams, MarkAllReadResponse};
use crate::adapters::http::error::{parse_id, ApiError};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::notification::SendBulkEmailCommand;
use crate::domain::foundation::NotificationId;

const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// GET /api/notifications?unread=true
pub async fn list_notifications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    params: Result<Query<InboxParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let inbox = state.inbox_handler().list(&user.id, params.unread).await?;
    Ok(Json(inbox))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: NotificationId = parse_id("Notification", &id)?;
    Ok(Json(state.inbox_handler().mark_read(&id, &user.id).await?))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.inbox_handler().mark_all_read(&user.id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: NotificationId = parse_id("Notification", &id)?;
    state.inbox_handler().delete(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/communications?limit= (staff)
pub async fn list_communications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.communications_handler().list(&user, limit).await?))
}

/// POST /api/communications/bulk (staff)
pub async fn send_bulk_email(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<BulkEmailRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let recipients = request
        .recipients
        .into_iter()
        .map(|r| r.into_recipient())
        .collect::<Result<Vec<_>, _>>()?;

    let record = state
        .bulk_email_handler()
        .handle(SendBulkEmailCommand {
            sender: user,
            subject: request.subject,
            content: request.content,
            recipients,
            audience: request.audience,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}
