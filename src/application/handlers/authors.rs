//! Author population for publication, comment and forum listings.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::publication::AuthorRef;
use crate::domain::user::AuthorSummary;
use crate::ports::UserRepository;

/// Resolves author ids to summaries in one lookup.
///
/// A failed lookup degrades to bare references instead of failing the read.
#[derive(Clone)]
pub struct AuthorDirectory {
    users: Arc<dyn UserRepository>,
}

impl AuthorDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn summaries(&self, ids: impl IntoIterator<Item = UserId>) -> Vec<AuthorSummary> {
        let mut ids: Vec<UserId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Vec::new();
        }
        match self.users.find_by_ids(&ids).await {
            Ok(users) => users.iter().map(|u| u.summary()).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "author lookup failed, returning references");
                Vec::new()
            }
        }
    }

    pub async fn resolve_one(&self, id: UserId) -> AuthorRef {
        let known = self.summaries([id]).await;
        AuthorRef::resolve(id, &known)
    }
}
