//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what the HTTP middleware injects after a bearer
//! token has been validated through the `SessionValidator` port. The role is
//! read from the user record on every validation, so a role change applies to
//! the very next request.

use super::{DomainError, ErrorCode, Role, UserId};
use thiserror::Error;

/// Caller identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub verified: bool,
}

impl AuthenticatedUser {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
            verified,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Forbidden` unless the caller is an admin or editor.
    pub fn require_privileged(&self) -> Result<(), DomainError> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Admin or editor role required",
            ))
        }
    }

    /// Fails with `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::new(ErrorCode::Forbidden, "Admin role required"))
        }
    }
}

/// Authentication errors that can occur during token validation or login.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the user no longer exists in the system.
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The authentication backend is unavailable (database, signing key).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ServiceUnavailable(msg) => DomainError::internal(msg),
            other => DomainError::unauthorized(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "ada@example.org", "Ada", role, true)
    }

    #[test]
    fn member_is_not_privileged() {
        let member = user_with(Role::Member);
        assert!(!member.is_privileged());
        assert_eq!(
            member.require_privileged().unwrap_err().code,
            ErrorCode::Forbidden
        );
    }

    #[test]
    fn editor_is_privileged_but_not_admin() {
        let editor = user_with(Role::Editor);
        assert!(editor.require_privileged().is_ok());
        assert!(editor.require_admin().is_err());
    }

    #[test]
    fn auth_error_requires_reauthentication_for_token_errors() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(AuthError::UserNotFound.requires_reauthentication());
        assert!(!AuthError::service_unavailable("db down").requires_reauthentication());
    }

    #[test]
    fn auth_error_maps_to_unauthorized() {
        let err: DomainError = AuthError::InvalidCredentials.into();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
