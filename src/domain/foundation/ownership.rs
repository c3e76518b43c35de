//! Ownership trait for user-owned resources.
//!
//! Publications, comments, forum posts and notifications all have a single
//! owning user. Handlers call `check_ownership` or `check_owner_or_privileged`
//! rather than comparing ids by hand.

use super::{AuthenticatedUser, DomainError, ErrorCode, UserId};

/// Trait for aggregates that have a single owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this resource.
    fn owner_id(&self) -> &UserId;

    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Validates ownership, returning `Forbidden` if the user is not the owner.
    fn check_ownership(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User does not own this resource",
            )
            .with_detail("owner_id", self.owner_id().to_string())
            .with_detail("requested_by", user_id.to_string()))
        }
    }

    /// Passes for the owner and for admin/editor callers.
    fn check_owner_or_privileged(&self, user: &AuthenticatedUser) -> Result<(), DomainError> {
        if user.is_privileged() {
            return Ok(());
        }
        self.check_ownership(&user.id)
    }
}
