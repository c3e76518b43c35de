//! Repository ports for news, comments, events and the forum.

use async_trait::async_trait;

use crate::domain::content::{Comment, Event, ForumReply, ForumThread, News};
use crate::domain::foundation::{
    CommentId, DomainError, EventId, NewsId, Page, Paginated, PublicationId, ReplyId, ThreadId,
    Timestamp,
};

#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn save(&self, news: &News) -> Result<(), DomainError>;
    async fn update(&self, news: &News) -> Result<(), DomainError>;
    async fn delete(&self, id: &NewsId) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: &NewsId) -> Result<Option<News>, DomainError>;

    /// Newest first. `published_only` hides drafts.
    async fn list(&self, published_only: bool, page: Page) -> Result<Paginated<News>, DomainError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn save(&self, comment: &Comment) -> Result<(), DomainError>;
    async fn delete(&self, id: &CommentId) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, DomainError>;

    /// Oldest first.
    async fn list_by_publication(
        &self,
        publication_id: &PublicationId,
    ) -> Result<Vec<Comment>, DomainError>;

    /// Removes every comment of a publication. Returns how many were removed.
    async fn delete_by_publication(&self, publication_id: &PublicationId)
        -> Result<u64, DomainError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn save(&self, event: &Event) -> Result<(), DomainError>;
    async fn update(&self, event: &Event) -> Result<(), DomainError>;
    async fn delete(&self, id: &EventId) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError>;

    /// Soonest first. With `ending_after`, events that already ended are
    /// left out.
    async fn list(&self, ending_after: Option<Timestamp>) -> Result<Vec<Event>, DomainError>;
}

#[async_trait]
pub trait ForumRepository: Send + Sync {
    async fn save_thread(&self, thread: &ForumThread) -> Result<(), DomainError>;
    async fn update_thread(&self, thread: &ForumThread) -> Result<(), DomainError>;

    /// Deletes the thread and its replies.
    async fn delete_thread(&self, id: &ThreadId) -> Result<(), DomainError>;
    async fn find_thread(&self, id: &ThreadId) -> Result<Option<ForumThread>, DomainError>;

    /// Pinned threads first, then most recent activity.
    async fn list_threads(
        &self,
        category: Option<&str>,
        page: Page,
    ) -> Result<Paginated<ForumThread>, DomainError>;

    async fn save_reply(&self, reply: &ForumReply) -> Result<(), DomainError>;
    async fn delete_reply(&self, id: &ReplyId) -> Result<(), DomainError>;
    async fn find_reply(&self, id: &ReplyId) -> Result<Option<ForumReply>, DomainError>;

    /// Oldest first.
    async fn list_replies(&self, thread_id: &ThreadId) -> Result<Vec<ForumReply>, DomainError>;
}
