//! Password hashing port.

use crate::domain::foundation::DomainError;

pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing PHC string.
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns `Ok(false)` on mismatch. Errors only for unreadable hashes.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
