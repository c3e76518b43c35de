//! HTTP handlers for news, events and the forum.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use validator::Validate;

use super::dto::{
    EventListParams, EventRequest, LockRequest, NewsRequest, PageParams, PinRequest, ReplyRequest,
    ThreadListParams, ThreadRequest,
};
use crate::adapters::http::error::{parse_id, ApiError};
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::domain::foundation::{EventId, NewsId, Page, ReplyId, ThreadId};

// ════════════════════════════════════════════════════════════════════════════════
// News
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/news - published items; staff also see drafts
pub async fn list_news(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let page = state.news_handler().list(viewer.as_ref(), params.page()).await?;
    Ok(Json(page))
}

/// GET /api/news/:id
pub async fn get_news(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: NewsId = parse_id("News", &id)?;
    Ok(Json(state.news_handler().get(&id, viewer.as_ref()).await?))
}

/// POST /api/news (staff)
pub async fn create_news(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<NewsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let news = state.news_handler().create(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

/// PUT /api/news/:id (staff)
pub async fn update_news(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<NewsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: NewsId = parse_id("News", &id)?;
    let Json(request) = payload?;
    request.validate()?;
    Ok(Json(state.news_handler().update(&user, &id, request.into()).await?))
}

/// DELETE /api/news/:id (staff)
pub async fn delete_news(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: NewsId = parse_id("News", &id)?;
    state.news_handler().delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/events?upcoming=true
pub async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<EventListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.events_handler().list(params.upcoming).await?))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = parse_id("Event", &id)?;
    Ok(Json(state.events_handler().get(&id).await?))
}

/// POST /api/events (staff)
pub async fn create_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let event = state.events_handler().create(&user, request.into_details()?).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/:id (staff)
pub async fn update_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = parse_id("Event", &id)?;
    let Json(request) = payload?;
    request.validate()?;
    let details = request.into_details()?;
    Ok(Json(state.events_handler().update(&user, &id, details).await?))
}

/// DELETE /api/events/:id (staff)
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = parse_id("Event", &id)?;
    state.events_handler().delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events/:id/register - premium events need an active subscription
pub async fn register_for_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = parse_id("Event", &id)?;
    Ok(Json(state.events_handler().register(&user, &id).await?))
}

/// DELETE /api/events/:id/register
pub async fn unregister_from_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = parse_id("Event", &id)?;
    Ok(Json(state.events_handler().unregister(&user, &id).await?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Forum
// ════════════════════════════════════════════════════════════════════════════════

fn thread_id(raw: &str) -> Result<ThreadId, ApiError> {
    parse_id("Thread", raw)
}

/// GET /api/forum/threads?category=
pub async fn list_threads(
    State(state): State<AppState>,
    params: Result<Query<ThreadListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let category = params.category.as_deref().filter(|c| !c.trim().is_empty());
    let page = state
        .forum_handler()
        .list_threads(category, Page::new(params.page, params.limit))
        .await?;
    Ok(Json(page))
}

/// GET /api/forum/threads/:id - thread with its replies
pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = thread_id(&id)?;
    Ok(Json(state.forum_handler().get_thread(&id).await?))
}

/// POST /api/forum/threads
pub async fn start_thread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<ThreadRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let thread = state
        .forum_handler()
        .start_thread(&user, &request.title, &request.body, request.category.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

/// PUT /api/forum/threads/:id
pub async fn edit_thread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<ThreadRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = thread_id(&id)?;
    let Json(request) = payload?;
    request.validate()?;
    let thread = state
        .forum_handler()
        .edit_thread(&user, &id, &request.title, &request.body)
        .await?;
    Ok(Json(thread))
}

/// DELETE /api/forum/threads/:id
pub async fn delete_thread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = thread_id(&id)?;
    state.forum_handler().delete_thread(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/forum/threads/:id/replies
pub async fn reply(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = thread_id(&id)?;
    let Json(request) = payload?;
    request.validate()?;
    let reply = state.forum_handler().reply(&user, &id, &request.body).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

/// PUT /api/forum/threads/:id/pin (staff)
pub async fn pin_thread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<PinRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = thread_id(&id)?;
    let Json(request) = payload?;
    Ok(Json(state.forum_handler().set_pinned(&user, &id, request.pinned).await?))
}

/// PUT /api/forum/threads/:id/lock (staff)
pub async fn lock_thread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<LockRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = thread_id(&id)?;
    let Json(request) = payload?;
    Ok(Json(state.forum_handler().set_locked(&user, &id, request.locked).await?))
}

/// DELETE /api/forum/replies/:id
pub async fn delete_reply(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ReplyId = parse_id("Reply", &id)?;
    state.forum_handler().delete_reply(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
