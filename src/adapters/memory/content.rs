use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{missing, paginate};
use crate::domain::content::{Comment, Event, ForumReply, ForumThread, News};
use crate::domain::foundation::{
    CommentId, DomainError, EventId, NewsId, Page, Paginated, PublicationId, ReplyId, ThreadId,
    Timestamp,
};
use crate::ports::{CommentRepository, EventRepository, ForumRepository, NewsRepository};

/// Replaces a stored item by id or reports it missing.
macro_rules! replace_or_missing {
    ($map:expr, $item:expr, $resource:literal) => {{
        match $map.get_mut(&$item.id) {
            Some(stored) => {
                *stored = $item.clone();
                Ok(())
            }
            None => Err(missing($resource, $item.id)),
        }
    }};
}

#[derive(Default)]
pub struct InMemoryNewsRepository {
    news: RwLock<HashMap<NewsId, News>>,
}

impl InMemoryNewsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsRepository for InMemoryNewsRepository {
    async fn save(&self, news: &News) -> Result<(), DomainError> {
        self.news.write().await.insert(news.id, news.clone());
        Ok(())
    }

    async fn update(&self, news: &News) -> Result<(), DomainError> {
        replace_or_missing!(self.news.write().await, news, "News")
    }

    async fn delete(&self, id: &NewsId) -> Result<(), DomainError> {
        self.news
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("News", id))
    }

    async fn find_by_id(&self, id: &NewsId) -> Result<Option<News>, DomainError> {
        Ok(self.news.read().await.get(id).cloned())
    }

    async fn list(&self, published_only: bool, page: Page) -> Result<Paginated<News>, DomainError> {
        let mut items: Vec<News> = self
            .news
            .read()
            .await
            .values()
            .filter(|n| !published_only || n.is_public())
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let a_key = a.published_at.unwrap_or(a.created_at);
            let b_key = b.published_at.unwrap_or(b.created_at);
            b_key.cmp(&a_key)
        });
        Ok(paginate(items, page))
    }
}

#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn save(&self, comment: &Comment) -> Result<(), DomainError> {
        self.comments.write().await.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete(&self, id: &CommentId) -> Result<(), DomainError> {
        self.comments
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("Comment", id))
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, DomainError> {
        Ok(self.comments.read().await.get(id).cloned())
    }

    async fn list_by_publication(
        &self,
        publication_id: &PublicationId,
    ) -> Result<Vec<Comment>, DomainError> {
        let mut items: Vec<Comment> = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| &c.publication_id == publication_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn delete_by_publication(
        &self,
        publication_id: &PublicationId,
    ) -> Result<u64, DomainError> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|_, c| &c.publication_id != publication_id);
        Ok((before - comments.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<EventId, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        self.events.write().await.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), DomainError> {
        replace_or_missing!(self.events.write().await, event, "Event")
    }

    async fn delete(&self, id: &EventId) -> Result<(), DomainError> {
        self.events
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("Event", id))
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list(&self, ending_after: Option<Timestamp>) -> Result<Vec<Event>, DomainError> {
        let mut items: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| ending_after.map_or(true, |t| !e.ends_at.is_before(&t)))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(items)
    }
}

#[derive(Default)]
pub struct InMemoryForumRepository {
    threads: RwLock<HashMap<ThreadId, ForumThread>>,
    replies: RwLock<HashMap<ReplyId, ForumReply>>,
}

impl InMemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForumRepository for InMemoryForumRepository {
    async fn save_thread(&self, thread: &ForumThread) -> Result<(), DomainError> {
        self.threads.write().await.insert(thread.id, thread.clone());
        Ok(())
    }

    async fn update_thread(&self, thread: &ForumThread) -> Result<(), DomainError> {
        replace_or_missing!(self.threads.write().await, thread, "Thread")
    }

    async fn delete_thread(&self, id: &ThreadId) -> Result<(), DomainError> {
        self.threads
            .write()
            .await
            .remove(id)
            .ok_or_else(|| missing("Thread", id))?;
        self.replies.write().await.retain(|_, r| &r.thread_id != id);
        Ok(())
    }

    async fn find_thread(&self, id: &ThreadId) -> Result<Option<ForumThread>, DomainError> {
        Ok(self.threads.read().await.get(id).cloned())
    }

    async fn list_threads(
        &self,
        category: Option<&str>,
        page: Page,
    ) -> Result<Paginated<ForumThread>, DomainError> {
        let mut items: Vec<ForumThread> = self
            .threads
            .read()
            .await
            .values()
            .filter(|t| category.map_or(true, |c| t.category.eq_ignore_ascii_case(c)))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.last_activity_at.cmp(&a.last_activity_at))
        });
        Ok(paginate(items, page))
    }

    async fn save_reply(&self, reply: &ForumReply) -> Result<(), DomainError> {
        self.replies.write().await.insert(reply.id, reply.clone());
        Ok(())
    }

    async fn delete_reply(&self, id: &ReplyId) -> Result<(), DomainError> {
        self.replies
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("Reply", id))
    }

    async fn find_reply(&self, id: &ReplyId) -> Result<Option<ForumReply>, DomainError> {
        Ok(self.replies.read().await.get(id).cloned())
    }

    async fn list_replies(&self, thread_id: &ThreadId) -> Result<Vec<ForumReply>, DomainError> {
        let mut items: Vec<ForumReply> = self
            .replies
            .read()
            .await
            .values()
            .filter(|r| &r.thread_id == thread_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[tokio::test]
    async fn pinned_threads_come_first() {
        let repo = InMemoryForumRepository::new();
        let mut pinned = ForumThread::start(UserId::new(), "Rules", "Read me", None).unwrap();
        pinned.set_pinned(true);
        let recent = ForumThread::start(UserId::new(), "Newest", "Hi", None).unwrap();
        repo.save_thread(&pinned).await.unwrap();
        repo.save_thread(&recent).await.unwrap();

        let page = repo.list_threads(None, Page::default()).await.unwrap();
        assert_eq!(page.items[0].id, pinned.id);
    }

    #[tokio::test]
    async fn deleting_a_thread_removes_its_replies() {
        let repo = InMemoryForumRepository::new();
        let mut thread = ForumThread::start(UserId::new(), "T", "B", None).unwrap();
        let reply = thread.reply(UserId::new(), "R").unwrap();
        repo.save_thread(&thread).await.unwrap();
        repo.save_reply(&reply).await.unwrap();

        repo.delete_thread(&thread.id).await.unwrap();
        assert!(repo.find_reply(&reply.id).await.unwrap().is_none());
    }
}
