//! Mock session validator for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

/// Maps fixed tokens to users. Unknown tokens are `InvalidToken`.
#[derive(Debug, Default, Clone)]
pub struct MockSessionValidator {
    tokens: HashMap<String, AuthenticatedUser>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens.insert(token.into(), user);
        self
    }

    /// Adds a token for a fresh verified user with `role`, returning the id.
    pub fn with_role(self, token: impl Into<String>, role: Role) -> (Self, UserId) {
        let token = token.into();
        let id = UserId::new();
        let user = AuthenticatedUser::new(
            id,
            format!("{}@test.example.org", token),
            token.clone(),
            role,
            true,
        );
        (self.with_user(token, user), id)
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}
