//! Publication lifecycle handlers.

mod create_publication;
mod delete_publication;
mod moderate_publication;
mod query_publications;
mod update_publication;

pub use create_publication::{CreatePublicationCommand, CreatePublicationHandler};
pub use delete_publication::{DeletePublicationCommand, DeletePublicationHandler};
pub use moderate_publication::{
    ModeratePublicationCommand, ModeratePublicationHandler, ModerationDecision,
};
pub use query_publications::{PublicationQueryHandler, PublicationView};
pub use update_publication::{UpdatePublicationCommand, UpdatePublicationHandler};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::adapters::memory::{
        InMemoryCommentRepository, InMemoryNotificationRepository, InMemoryPublicationRepository,
        InMemoryUserRepository,
    };
    use crate::domain::foundation::{AuthenticatedUser, PublicationId, Role, UserId};
    use crate::domain::publication::{Publication, PublicationFields, PublicationStatus};
    use crate::ports::PublicationRepository;

    #[derive(Default)]
    pub struct Stores {
        pub publications: Arc<InMemoryPublicationRepository>,
        pub users: Arc<InMemoryUserRepository>,
        pub notifications: Arc<InMemoryNotificationRepository>,
        pub comments: Arc<InMemoryCommentRepository>,
    }

    impl Stores {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn publication(&self, author: UserId, status: PublicationStatus) -> Publication {
            let fields =
                PublicationFields::new("Field notes", "Body text", "research", None).unwrap();
            let mut publication = Publication::create(PublicationId::new(), author, fields, false);
            publication.status = status;
            self.publications.save(&publication).await.unwrap();
            publication
        }
    }

    pub fn caller(role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "caller@example.org", "Caller", role, true)
    }
}
