//! User repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Page, Paginated, Role, UserId};
use crate::domain::user::User;

/// Repository port for user accounts.
///
/// Implementations must enforce case-insensitive email uniqueness. Callers
/// pass emails already normalized by `normalize_email`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the email is already registered
    /// - `DatabaseError` on persistence failure
    async fn create(&self, user: &User) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if the user doesn't exist
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if the user doesn't exist
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// All users with any of the given ids. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError>;

    /// Newest accounts first.
    async fn list(&self, page: Page) -> Result<Paginated<User>, DomainError>;

    /// Every user holding one of `roles`. Used to resolve bulk email audiences.
    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, DomainError>;
}
