//! LoginHandler - exchanges email and password for a bearer token.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, DomainError};
use crate::domain::user::normalize_email;
use crate::ports::{CredentialHasher, TokenIssuer, UserRepository};

use super::AuthSession;

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

pub struct LoginHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl LoginHandler {
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

    /// Unknown email, wrong password and credential-less accounts all fail
    /// with the same `Unauthorized` error.
    pub async fn handle(&self, cmd: LoginCommand) -> Result<AuthSession, DomainError> {
        let email = normalize_email(&cmd.email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&cmd.password, hash)? {
            tracing::info!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthSession { token, user })
    }
}
