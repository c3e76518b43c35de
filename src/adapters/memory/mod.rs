//! In-memory repository adapters.
//!
//! Deterministic implementations of every persistence port, used by the
//! handler and HTTP tests and by `GUILDHALL__DATABASE__URL`-less local runs.
//! Data lives for the lifetime of the process only.

mod content;
mod notifications;
mod publications;
mod subscriptions;
mod users;

pub use content::{
    InMemoryCommentRepository, InMemoryEventRepository, InMemoryForumRepository,
    InMemoryNewsRepository,
};
pub use notifications::{InMemoryCommunicationRepository, InMemoryNotificationRepository};
pub use publications::InMemoryPublicationRepository;
pub use subscriptions::{
    InMemoryPaymentHistoryRepository, InMemoryPlanRepository, InMemorySubscriptionRepository,
};
pub use users::InMemoryUserRepository;

use crate::domain::foundation::{DomainError, Page, Paginated};

fn missing(resource: &'static str, id: impl std::fmt::Display) -> DomainError {
    DomainError::not_found(resource, id)
}

/// Slices an already-sorted vector into one page.
fn paginate<T>(items: Vec<T>, page: Page) -> Paginated<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.size() as usize)
        .collect();
    Paginated::new(items, total, page)
}
