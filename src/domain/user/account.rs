//! User account aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    required_text, DomainError, Role, Timestamp, UserId, ValidationError,
};

const MAX_NAME_LEN: usize = 120;
const MAX_EMAIL_LEN: usize = 254;
const MAX_BIO_LEN: usize = 2000;

/// Public-facing profile sub-document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

/// Professional details sub-document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub organization: Option<String>,
    pub position: Option<String>,
    pub specialization: Option<String>,
    pub years_of_experience: Option<u32>,
}

/// Registered account.
///
/// # Invariants
///
/// - `email` is stored trimmed and lowercase, unique across users
/// - `password_hash` is `None` for externally authenticated users
/// - a user never changes their own role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub verified: bool,
    pub profile: Profile,
    pub professional: Professional,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Summary used when populating authors on content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl User {
    /// Registers a new member account with a password credential.
    pub fn register(
        id: UserId,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Self, ValidationError> {
        let mut user = Self::external(id, name, email)?;
        user.password_hash = Some(password_hash);
        Ok(user)
    }

    /// Creates an account without a local credential.
    pub fn external(id: UserId, name: &str, email: &str) -> Result<Self, ValidationError> {
        let now = Timestamp::now();
        Ok(Self {
            id,
            name: required_text("name", name, MAX_NAME_LEN)?,
            email: normalize_email(email)?,
            password_hash: None,
            role: Role::Member,
            verified: false,
            profile: Profile::default(),
            professional: Professional::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the name and sub-documents. `None` leaves a part untouched.
    pub fn update_profile(
        &mut self,
        name: Option<&str>,
        profile: Option<Profile>,
        professional: Option<Professional>,
    ) -> Result<(), ValidationError> {
        if let Some(name) = name {
            self.name = required_text("name", name, MAX_NAME_LEN)?;
        }
        if let Some(profile) = profile {
            if profile
                .bio
                .as_ref()
                .is_some_and(|bio| bio.chars().count() > MAX_BIO_LEN)
            {
                return Err(ValidationError::too_long("profile.bio", MAX_BIO_LEN));
            }
            self.profile = profile;
        }
        if let Some(professional) = professional {
            self.professional = professional;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Applies a role change requested by `actor`.
    ///
    /// Fails with a validation error whenever the actor targets their own
    /// account, whatever the actor's role. Admin authority is checked by the
    /// caller.
    pub fn change_role(&mut self, actor: &UserId, role: Role) -> Result<(), DomainError> {
        if &self.id == actor {
            return Err(DomainError::validation(
                "role",
                "You cannot change your own role",
            ));
        }
        self.role = role;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            name: self.name.clone(),
            avatar: self.profile.avatar.clone(),
        }
    }
}

/// Trims and lowercases an email address after a minimal shape check.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = required_text("email", email, MAX_EMAIL_LEN)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ValidationError::invalid_format(
            "email",
            "expected an address like name@example.org",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn member() -> User {
        User::register(UserId::new(), "Grace Hopper", "Grace@Example.ORG ", "hash".into()).unwrap()
    }

    #[test]
    fn register_normalizes_email_and_defaults_to_member() {
        let user = member();
        assert_eq!(user.email, "grace@example.org");
        assert_eq!(user.role, Role::Member);
        assert!(!user.verified);
        assert_eq!(user.password_hash.as_deref(), Some("hash"));
    }

    #[test]
    fn register_rejects_malformed_email() {
        assert!(User::register(UserId::new(), "X", "no-at-sign", "h".into()).is_err());
        assert!(User::register(UserId::new(), "X", "a@localhost", "h".into()).is_err());
    }

    #[test]
    fn external_user_has_no_credential() {
        let user = User::external(UserId::new(), "Ext", "ext@example.org").unwrap();
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn changing_own_role_is_a_validation_error() {
        let mut user = member();
        let own_id = user.id;
        let err = user.change_role(&own_id, Role::Admin).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(user.role, Role::Member);
    }

    #[test]
    fn another_actor_can_change_role() {
        let mut user = member();
        user.change_role(&UserId::new(), Role::Editor).unwrap();
        assert_eq!(user.role, Role::Editor);
    }

    #[test]
    fn update_profile_replaces_given_parts_only() {
        let mut user = member();
        user.update_profile(
            None,
            Some(Profile {
                avatar: Some("a.png".into()),
                bio: None,
            }),
            None,
        )
        .unwrap();
        assert_eq!(user.name, "Grace Hopper");
        assert_eq!(user.summary().avatar.as_deref(), Some("a.png"));
    }
}
