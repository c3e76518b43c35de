//! Token issuing port, used at register and login.

use crate::domain::foundation::{AuthError, Timestamp};
use crate::domain::user::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<IssuedToken, AuthError>;
}
