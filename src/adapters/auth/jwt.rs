//! HS256 JWT issuing and validation.
//!
//! The token carries the user id and role at issue time. Validation re-reads
//! the user record, so deleted users are rejected and role changes take
//! effect on the next request.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::{IssuedToken, SessionValidator, TokenIssuer, UserRepository};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtTokenService {
    secret: SecretString,
    ttl: Duration,
    users: Arc<dyn UserRepository>,
}

impl JwtTokenService {
    pub fn new(secret: SecretString, ttl: Duration, users: Arc<dyn UserRepository>) -> Self {
        Self { secret, ttl, users }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })
    }
}

impl TokenIssuer for JwtTokenService {
    fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let issued_at = Timestamp::now();
        let expires_at = Timestamp::from_datetime(*issued_at.as_datetime() + self.ttl);
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: issued_at.as_datetime().timestamp(),
            exp: expires_at.as_datetime().timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key())
            .map_err(|e| AuthError::service_unavailable(format!("Failed to sign token: {}", e)))?;
        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl SessionValidator for JwtTokenService {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode_claims(token)?;
        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthenticatedUser::new(
            user.id,
            user.email,
            user.name,
            user.role,
            user.verified,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUserRepository;

    async fn service_with_user() -> (JwtTokenService, Arc<InMemoryUserRepository>, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = User::register(UserId::new(), "Ada", "ada@example.org", "h".into()).unwrap();
        users.create(&user).await.unwrap();
        let service = JwtTokenService::new(
            SecretString::new("test-secret-of-reasonable-length".into()),
            Duration::days(7),
            users.clone(),
        );
        (service, users, user)
    }

    #[tokio::test]
    async fn issued_token_validates_to_the_same_user() {
        let (service, _, user) = service_with_user().await;
        let issued = service.issue(&user).unwrap();
        let auth = service.validate(&issued.token).await.unwrap();
        assert_eq!(auth.id, user.id);
        assert_eq!(auth.role, Role::Member);
    }

    #[tokio::test]
    async fn role_is_read_from_the_current_record() {
        let (service, users, mut user) = service_with_user().await;
        let issued = service.issue(&user).unwrap();
        user.change_role(&UserId::new(), Role::Editor).unwrap();
        users.update(&user).await.unwrap();

        let auth = service.validate(&issued.token).await.unwrap();
        assert_eq!(auth.role, Role::Editor);
    }

    #[tokio::test]
    async fn deleted_user_is_rejected() {
        let (service, users, user) = service_with_user().await;
        let issued = service.issue(&user).unwrap();
        users.delete(&user.id).await.unwrap();
        assert_eq!(
            service.validate(&issued.token).await.unwrap_err(),
            AuthError::UserNotFound
        );
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let (service, _, user) = service_with_user().await;
        let now = Timestamp::now().as_datetime().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &service.encoding_key(),
        )
        .unwrap();
        assert_eq!(
            service.validate(&token).await.unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_invalid() {
        let (service, users, user) = service_with_user().await;
        let other = JwtTokenService::new(
            SecretString::new("a-completely-different-secret".into()),
            Duration::days(7),
            users,
        );
        let issued = other.issue(&user).unwrap();
        assert_eq!(
            service.validate(&issued.token).await.unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            service.validate("not-a-jwt").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
