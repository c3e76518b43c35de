//! ProfileHandler - the caller's own account.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::{Professional, Profile, User};
use crate::ports::UserRepository;

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileCommand {
    pub user_id: UserId,
    pub name: Option<String>,
    pub profile: Option<Profile>,
    pub professional: Option<Professional>,
}

pub struct ProfileHandler {
    users: Arc<dyn UserRepository>,
}

impl ProfileHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn me(&self, user_id: &UserId) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    pub async fn update(&self, cmd: UpdateProfileCommand) -> Result<User, DomainError> {
        let mut user = self.me(&cmd.user_id).await?;
        user.update_profile(cmd.name.as_deref(), cmd.profile, cmd.professional)?;
        self.users.update(&user).await?;
        tracing::debug!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUserRepository;
    use crate::domain::foundation::ErrorCode;

    #[tokio::test]
    async fn update_replaces_given_parts_only() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = User::register(UserId::new(), "Jason", "jason@example.org", "h".into()).unwrap();
        users.create(&user).await.unwrap();
        let handler = ProfileHandler::new(users);

        let updated = handler
            .update(UpdateProfileCommand {
                user_id: user.id,
                professional: Some(Professional {
                    organization: Some("Teaching Hospital".into()),
                    years_of_experience: Some(7),
                    ..Professional::default()
                }),
                ..UpdateProfileCommand::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Jason");
        assert_eq!(updated.professional.years_of_experience, Some(7));
        assert_eq!(handler.me(&user.id).await.unwrap().professional, updated.professional);
    }

    #[tokio::test]
    async fn oversized_bio_is_rejected() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = User::register(UserId::new(), "Jason", "jason@example.org", "h".into()).unwrap();
        users.create(&user).await.unwrap();

        let err = ProfileHandler::new(users)
            .update(UpdateProfileCommand {
                user_id: user.id,
                profile: Some(Profile {
                    avatar: None,
                    bio: Some("b".repeat(2001)),
                }),
                ..UpdateProfileCommand::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let users = Arc::new(InMemoryUserRepository::new());
        let err = ProfileHandler::new(users).me(&UserId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
