//! Request and response bodies for the auth and user endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::handlers::user::AuthSession;
use crate::domain::foundation::{Role, Timestamp, UserId};
use crate::domain::user::{Professional, Profile, User};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub profile: Option<Profile>,
    pub professional: Option<Professional>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Account as clients see it. The credential hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub profile: Profile,
    pub professional: Professional,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            verified: user.verified,
            profile: user.profile,
            professional: user.professional,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: Timestamp,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            user: session.user.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_omits_password_hash() {
        let user = User::register(
            UserId::new(),
            "Chidi Eze",
            "chidi@example.org",
            "argon2-hash".into(),
        )
        .unwrap();
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "member");
    }

    #[test]
    fn register_request_rejects_bad_email() {
        let request = RegisterRequest {
            name: "Chidi".into(),
            email: "not-an-email".into(),
            password: "long-enough".into(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
