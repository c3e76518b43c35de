//! HTTP handlers for auth and user endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use validator::Validate;

use super::dto::{
    AuthResponse, LoginRequest, PageParams, RegisterRequest, UpdateProfileRequest,
    UpdateRoleRequest, UserResponse,
};
use crate::adapters::http::error::{parse_id, ApiError};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::user::{
    LoginCommand, RegisterCommand, UpdateProfileCommand, UpdateRoleCommand,
};
use crate::domain::foundation::{Page, Role, UserId};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let session = state
        .register_handler()
        .handle(RegisterCommand {
            name: request.name,
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let session = state
        .login_handler()
        .handle(LoginCommand {
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(AuthResponse::from(session)))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.profile_handler().me(&user.id).await?;
    Ok(Json(UserResponse::from(account)))
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let account = state
        .profile_handler()
        .update(UpdateProfileCommand {
            user_id: user.id,
            name: request.name,
            profile: request.profile,
            professional: request.professional,
        })
        .await?;

    Ok(Json(UserResponse::from(account)))
}

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let page = state
        .manage_users_handler()
        .list(&user, Page::new(params.page, params.limit))
        .await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// PUT /api/users/:id/role (admin)
pub async fn update_role(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let target_id: UserId = parse_id("User", &id)?;
    let Json(request) = payload?;
    let role: Role = request.role.parse()?;

    let updated = state
        .manage_users_handler()
        .update_role(UpdateRoleCommand {
            actor: user,
            target_id,
            role,
        })
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// DELETE /api/users/:id (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target_id: UserId = parse_id("User", &id)?;
    state.manage_users_handler().delete(&user, &target_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
