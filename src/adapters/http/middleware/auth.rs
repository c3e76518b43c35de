//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - validates Bearer tokens and injects the caller into extensions
//! - `RequireAuth` - extractor that requires authentication
//! - `OptionalAuth` - extractor for routes that serve guests too
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```
//!
//! The middleware only talks to the `SessionValidator` port, so tests swap in
//! `MockSessionValidator` without touching the routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::super::error::ErrorResponse;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates the Bearer token, if any.
///
/// 1. No `Authorization: Bearer` header: continue as a guest
/// 2. Valid token: inject `AuthenticatedUser` and continue
/// 3. Invalid or expired token: 401 without reaching the handler
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let (status, code) = match &e {
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!(error = %msg, "auth service unavailable");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
                _ => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            };
            (status, Json(ErrorResponse::new(code, e.to_string()))).into_response()
        }
    }
}

/// Extractor that requires an authenticated caller.
///
/// ```ignore
/// async fn me(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     user.email
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// `Some(user)` when a valid token was sent, `None` for guests.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("UNAUTHORIZED", "Authentication required")),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::{Role, UserId};
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "ngozi@example.org", "Ngozi", Role::Member, true)
    }

    fn app(validator: MockSessionValidator) -> Router {
        let state: AuthState = Arc::new(validator);
        Router::new()
            .route("/private", get(|RequireAuth(u): RequireAuth| async move { u.email }))
            .route(
                "/public",
                get(|OptionalAuth(u): OptionalAuth| async move {
                    u.map(|u| u.name).unwrap_or_else(|| "guest".to_string())
                }),
            )
            .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
    }

    async fn get_status(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        response.status()
    }

    #[tokio::test]
    async fn valid_token_reaches_protected_route() {
        let app = app(MockSessionValidator::new().with_user("good", test_user()));
        assert_eq!(get_status(app, "/private", Some("good")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_rejected_by_require_auth() {
        let app = app(MockSessionValidator::new());
        assert_eq!(get_status(app, "/private", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn guests_reach_optional_routes() {
        let app = app(MockSessionValidator::new());
        assert_eq!(get_status(app, "/public", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_even_on_optional_routes() {
        let app = app(MockSessionValidator::new());
        assert_eq!(
            get_status(app, "/public", Some("forged")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn require_auth_fails_without_user() {
        let request: HttpRequest<()> = HttpRequest::builder().uri("/x").body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[test]
    fn auth_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<RequireAuth>();
    }
}
