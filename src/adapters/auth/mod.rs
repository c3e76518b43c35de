//! Authentication adapters.
//!
//! - `JwtTokenService` - HS256 tokens, implements `TokenIssuer` and `SessionValidator`
//! - `Argon2Hasher` - password hashing behind `CredentialHasher`
//! - `MockSessionValidator` - fixed token table for tests

mod jwt;
mod mock;
mod password;

pub use jwt::{Claims, JwtTokenService};
pub use mock::MockSessionValidator;
pub use password::Argon2Hasher;
