//! Admin user management.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, DomainError, Page, Paginated, Role, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

#[derive(Debug, Clone)]
pub struct UpdateRoleCommand {
    pub actor: AuthenticatedUser,
    pub target_id: UserId,
    pub role: Role,
}

pub struct ManageUsersHandler {
    users: Arc<dyn UserRepository>,
}

impl ManageUsersHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        page: Page,
    ) -> Result<Paginated<User>, DomainError> {
        actor.require_admin()?;
        self.users.list(page).await
    }

    /// Self-targeting is a validation error for every caller, checked before
    /// the admin requirement.
    pub async fn update_role(&self, cmd: UpdateRoleCommand) -> Result<User, DomainError> {
        if cmd.target_id == cmd.actor.id {
            return Err(DomainError::validation("role", "You cannot change your own role"));
        }
        cmd.actor.require_admin()?;

        let mut user = self
            .users
            .find_by_id(&cmd.target_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", cmd.target_id))?;
        user.change_role(&cmd.actor.id, cmd.role)?;
        self.users.update(&user).await?;

        tracing::info!(
            actor_id = %cmd.actor.id,
            user_id = %user.id,
            role = %user.role,
            "user role changed"
        );
        Ok(user)
    }

    pub async fn delete(
        &self,
        actor: &AuthenticatedUser,
        target_id: &UserId,
    ) -> Result<(), DomainError> {
        actor.require_admin()?;
        if &actor.id == target_id {
            return Err(DomainError::validation("id", "You cannot delete your own account"));
        }
        self.users.delete(target_id).await?;
        tracing::info!(actor_id = %actor.id, user_id = %target_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUserRepository;
    use crate::domain::foundation::ErrorCode;

    fn caller(id: UserId, role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(id, "caller@example.org", "Caller", role, true)
    }

    async fn seeded() -> (ManageUsersHandler, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let target =
            User::register(UserId::new(), "Target", "target@example.org", "h".into()).unwrap();
        users.create(&target).await.unwrap();
        (ManageUsersHandler::new(users), target)
    }

    #[tokio::test]
    async fn admin_promotes_member() {
        let (handler, target) = seeded().await;
        let user = handler
            .update_role(UpdateRoleCommand {
                actor: caller(UserId::new(), Role::Admin),
                target_id: target.id,
                role: Role::Editor,
            })
            .await
            .unwrap();
        assert_eq!(user.role, Role::Editor);
    }

    #[tokio::test]
    async fn changing_own_role_is_a_validation_error_for_any_role() {
        let (handler, _) = seeded().await;
        for role in [Role::Admin, Role::Editor, Role::Member] {
            let me = UserId::new();
            let err = handler
                .update_role(UpdateRoleCommand {
                    actor: caller(me, role),
                    target_id: me,
                    role: Role::Admin,
                })
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
        }
    }

    #[tokio::test]
    async fn non_admin_cannot_change_roles() {
        let (handler, target) = seeded().await;
        let err = handler
            .update_role(UpdateRoleCommand {
                actor: caller(UserId::new(), Role::Editor),
                target_id: target.id,
                role: Role::Admin,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let (handler, _) = seeded().await;
        let err = handler
            .update_role(UpdateRoleCommand {
                actor: caller(UserId::new(), Role::Admin),
                target_id: UserId::new(),
                role: Role::Editor,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn admin_cannot_delete_self_but_can_delete_others() {
        let (handler, target) = seeded().await;
        let admin = caller(UserId::new(), Role::Admin);
        let err = handler.delete(&admin, &admin.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        handler.delete(&admin, &target.id).await.unwrap();
        assert_eq!(handler.list(&admin, Page::default()).await.unwrap().total, 0);
    }
}
