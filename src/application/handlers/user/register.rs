//! RegisterHandler - creates a member account and signs it in.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::{normalize_email, User};
use crate::ports::{CredentialHasher, IssuedToken, TokenIssuer, UserRepository};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A freshly issued bearer token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: IssuedToken,
    pub user: User,
}

pub struct RegisterHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl RegisterHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<AuthSession, DomainError> {
        if cmd.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        let email = normalize_email(&cmd.email)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("Email is already registered"));
        }

        let hash = self.hasher.hash(&cmd.password)?;
        let user = User::register(UserId::new(), &cmd.name, &email, hash)?;
        // The unique index still rejects a concurrent duplicate here
        self.users.create(&user).await?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(AuthSession { token, user })
    }
}
