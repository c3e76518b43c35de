use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{missing, paginate};
use crate::domain::foundation::{DomainError, Page, Paginated, Role, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict("Email is already registered")
                .with_detail("field", "email"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(DomainError::conflict("Email is already registered"));
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(missing("User", user.id)),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("User", id))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list(&self, page: Page) -> Result<Paginated<User>, DomainError> {
        let mut all: Vec<User> = self.users.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(all, page))
    }

    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, DomainError> {
        let mut matching: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }
}
