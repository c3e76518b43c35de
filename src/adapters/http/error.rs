//! API error responses.
//!
//! Every failure leaves the server as
//! `{ "error": CODE, "message": text, "details"?: {...} }` with the status
//! code derived from the `ErrorCode`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use validator::ValidationErrors;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// HTTP status for each error category.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::VerificationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UpstreamFailure
        | ErrorCode::Configuration
        | ErrorCode::DatabaseError
        | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error type returned by every HTTP handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        Self(DomainError::validation(field, message))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();
        let first = fields.first().cloned().unwrap_or_else(|| "body".to_string());
        let mut err = DomainError::validation(&first, format!("Invalid value for '{}'", first));
        if fields.len() > 1 {
            err = err.with_detail("fields", fields.join(","));
        }
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("path", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("query", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let DomainError {
            code,
            message,
            details,
        } = self.0;
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = %code, message = %message, ?details, "request failed");
        }
        let body = ErrorResponse {
            error: code.as_str().to_string(),
            message,
            details: (!details.is_empty()).then_some(details),
        };
        (status, Json(body)).into_response()
    }
}

/// Parses a path segment into a typed id, answering 404 for garbage so
/// malformed ids look like unknown ones.
pub fn parse_id<T: std::str::FromStr>(resource: &'static str, raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(DomainError::not_found(resource, raw)))
}
