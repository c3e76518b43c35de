//! HTTP handlers for publication and comment endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use validator::Validate;

use super::dto::{
    CommentRequest, ListPublicationsParams, MineParams, PublicationRequest, RejectRequest,
};
use crate::adapters::http::error::{parse_id, ApiError};
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::publication::{
    CreatePublicationCommand, DeletePublicationCommand, ModeratePublicationCommand,
    ModerationDecision, UpdatePublicationCommand,
};
use crate::domain::foundation::{AuthenticatedUser, CommentId, PublicationId};
use crate::ports::PublicationQuery;

fn publication_id(raw: &str) -> Result<PublicationId, ApiError> {
    parse_id("Publication", raw)
}

/// GET /api/publications - approved publications, newest first
pub async fn list_publications(
    State(state): State<AppState>,
    params: Result<Query<ListPublicationsParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let query = PublicationQuery::from(params);
    let page = state.publication_query_handler().list_approved(&query).await?;
    Ok(Json(page))
}

/// POST /api/publications
pub async fn create_publication(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<PublicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let publication = state
        .create_publication_handler()
        .handle(CreatePublicationCommand {
            author_id: user.id,
            title: request.title,
            content: request.content,
            category: request.category,
            image: request.image,
            draft: request.draft,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(publication)))
}

/// GET /api/publications/mine?status=
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    params: Result<Query<MineParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let status = params.status()?;
    let mine = state.publication_query_handler().list_mine(&user.id, status).await?;
    Ok(Json(mine))
}

/// GET /api/publications/pending - moderation queue, oldest first
pub async fn list_pending(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let queue = state.publication_query_handler().list_pending(&user).await?;
    Ok(Json(queue))
}

/// GET /api/publications/:id
pub async fn get_publication(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = publication_id(&id)?;
    let view = state
        .publication_query_handler()
        .get_one(&id, viewer.as_ref())
        .await?;
    Ok(Json(view))
}

/// PUT /api/publications/:id - author edit, goes back to review
pub async fn update_publication(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<PublicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = publication_id(&id)?;
    let Json(request) = payload?;
    request.validate()?;

    let publication = state
        .update_publication_handler()
        .handle(UpdatePublicationCommand {
            id,
            editor_id: user.id,
            title: request.title,
            content: request.content,
            category: request.category,
            image: request.image,
        })
        .await?;

    Ok(Json(publication))
}

/// DELETE /api/publications/:id
pub async fn delete_publication(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = publication_id(&id)?;
    state
        .delete_publication_handler()
        .handle(DeletePublicationCommand {
            id,
            user_id: user.id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn moderate(
    state: &AppState,
    moderator: AuthenticatedUser,
    raw_id: &str,
    decision: ModerationDecision,
) -> Result<impl IntoResponse, ApiError> {
    let id = publication_id(raw_id)?;
    let publication = state
        .moderate_publication_handler()
        .handle(ModeratePublicationCommand {
            moderator,
            id,
            decision,
        })
        .await?;
    Ok(Json(publication))
}

/// PUT /api/publications/:id/approve
pub async fn approve_publication(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    moderate(&state, user, &id, ModerationDecision::Approve).await
}

/// PUT /api/publications/:id/reject - body `{ "reason"?: text }`, may be empty
pub async fn reject_publication(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Option<Json<RejectRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let reason = payload.and_then(|Json(body)| body.reason);
    moderate(&state, user, &id, ModerationDecision::Reject { reason }).await
}

/// GET /api/publications/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = publication_id(&id)?;
    let comments = state.comments_handler().list(&id).await?;
    Ok(Json(comments))
}

/// POST /api/publications/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = publication_id(&id)?;
    let Json(request) = payload?;
    request.validate()?;

    let comment = state.comments_handler().add(&user, &id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CommentId = parse_id("Comment", &id)?;
    state.comments_handler().delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
