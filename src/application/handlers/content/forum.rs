//! Discussion forum threads and replies.

use std::sync::Arc;

use serde::Serialize;

use crate::application::handlers::authors::AuthorDirectory;
use crate::application::handlers::notification::Notifier;
use crate::domain::content::{ForumReply, ForumThread};
use crate::domain::foundation::{
    AuthenticatedUser, DomainError, OwnedByUser, Page, Paginated, ReplyId, ThreadId,
};
use crate::domain::notification::NotificationType;
use crate::domain::publication::AuthorRef;
use crate::ports::ForumRepository;

#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    #[serde(flatten)]
    pub thread: ForumThread,
    pub author: AuthorRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    #[serde(flatten)]
    pub reply: ForumReply,
    pub author: AuthorRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: ThreadView,
    pub replies: Vec<ReplyView>,
}

pub struct ForumHandler {
    forum: Arc<dyn ForumRepository>,
    authors: AuthorDirectory,
    notifier: Notifier,
}

impl ForumHandler {
    pub fn new(
        forum: Arc<dyn ForumRepository>,
        authors: AuthorDirectory,
        notifier: Notifier,
    ) -> Self {
        Self {
            forum,
            authors,
            notifier,
        }
    }

    async fn thread(&self, id: &ThreadId) -> Result<ForumThread, DomainError> {
        self.forum
            .find_thread(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Thread", id))
    }

    /// Pinned first, then most recent activity.
    pub async fn list_threads(
        &self,
        category: Option<&str>,
        page: Page,
    ) -> Result<Paginated<ThreadView>, DomainError> {
        let threads = self.forum.list_threads(category, page).await?;
        let known = self
            .authors
            .summaries(threads.items.iter().map(|t| t.author_id))
            .await;
        Ok(threads.map(|thread| ThreadView {
            author: AuthorRef::resolve(thread.author_id, &known),
            thread,
        }))
    }

    pub async fn get_thread(&self, id: &ThreadId) -> Result<ThreadDetail, DomainError> {
        let thread = self.thread(id).await?;
        let replies = self.forum.list_replies(id).await?;
        let known = self
            .authors
            .summaries(
                std::iter::once(thread.author_id).chain(replies.iter().map(|r| r.author_id)),
            )
            .await;
        Ok(ThreadDetail {
            thread: ThreadView {
                author: AuthorRef::resolve(thread.author_id, &known),
                thread,
            },
            replies: replies
                .into_iter()
                .map(|reply| ReplyView {
                    author: AuthorRef::resolve(reply.author_id, &known),
                    reply,
                })
                .collect(),
        })
    }

    pub async fn start_thread(
        &self,
        caller: &AuthenticatedUser,
        title: &str,
        body: &str,
        category: Option<&str>,
    ) -> Result<ForumThread, DomainError> {
        let thread = ForumThread::start(caller.id, title, body, category)?;
        self.forum.save_thread(&thread).await?;
        tracing::info!(thread_id = %thread.id, category = %thread.category, "forum thread started");
        Ok(thread)
    }

    pub async fn edit_thread(
        &self,
        caller: &AuthenticatedUser,
        id: &ThreadId,
        title: &str,
        body: &str,
    ) -> Result<ForumThread, DomainError> {
        let mut thread = self.thread(id).await?;
        thread.check_owner_or_privileged(caller)?;
        thread.edit(title, body)?;
        self.forum.update_thread(&thread).await?;
        Ok(thread)
    }

    pub async fn delete_thread(
        &self,
        caller: &AuthenticatedUser,
        id: &ThreadId,
    ) -> Result<(), DomainError> {
        let thread = self.thread(id).await?;
        thread.check_owner_or_privileged(caller)?;
        self.forum.delete_thread(id).await?;
        tracing::info!(thread_id = %id, "forum thread deleted");
        Ok(())
    }

    /// Locked threads refuse replies with `Forbidden`.
    pub async fn reply(
        &self,
        caller: &AuthenticatedUser,
        thread_id: &ThreadId,
        body: &str,
    ) -> Result<ReplyView, DomainError> {
        let mut thread = self.thread(thread_id).await?;
        let reply = thread.reply(caller.id, body)?;
        self.forum.save_reply(&reply).await?;
        self.forum.update_thread(&thread).await?;

        if !thread.is_owner(&caller.id) {
            let message = format!("{} replied to \"{}\"", caller.name, thread.title);
            self.notifier
                .notify(thread.author_id, "New reply", &message, NotificationType::Forum)
                .await;
        }

        let author = self.authors.resolve_one(reply.author_id).await;
        Ok(ReplyView { reply, author })
    }

    pub async fn delete_reply(
        &self,
        caller: &AuthenticatedUser,
        id: &ReplyId,
    ) -> Result<(), DomainError> {
        let reply = self
            .forum
            .find_reply(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reply", id))?;
        reply.check_owner_or_privileged(caller)?;
        self.forum.delete_reply(id).await?;

        if let Some(mut thread) = self.forum.find_thread(&reply.thread_id).await? {
            thread.reply_removed();
            self.forum.update_thread(&thread).await?;
        }
        Ok(())
    }

    pub async fn set_pinned(
        &self,
        caller: &AuthenticatedUser,
        id: &ThreadId,
        pinned: bool,
    ) -> Result<ForumThread, DomainError> {
        caller.require_privileged()?;
        let mut thread = self.thread(id).await?;
        thread.set_pinned(pinned);
        self.forum.update_thread(&thread).await?;
        Ok(thread)
    }

    pub async fn set_locked(
        &self,
        caller: &AuthenticatedUser,
        id: &ThreadId,
        locked: bool,
    ) -> Result<ForumThread, DomainError> {
        caller.require_privileged()?;
        let mut thread = self.thread(id).await?;
        thread.set_locked(locked);
        self.forum.update_thread(&thread).await?;
        tracing::info!(thread_id = %id, locked, "forum thread lock changed");
        Ok(thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryForumRepository, InMemoryNotificationRepository, InMemoryUserRepository,
    };
    use crate::domain::foundation::{ErrorCode, Role, UserId};
    use crate::ports::NotificationRepository;

    fn caller(role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "c@example.org", "Kemi", role, true)
    }

    fn handler() -> (ForumHandler, Arc<InMemoryNotificationRepository>) {
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let handler = ForumHandler::new(
            Arc::new(InMemoryForumRepository::new()),
            AuthorDirectory::new(Arc::new(InMemoryUserRepository::new())),
            Notifier::new(notifications.clone()),
        );
        (handler, notifications)
    }

    #[tokio::test]
    async fn reply_counts_and_notifies_thread_author() {
        let (handler, notifications) = handler();
        let author = caller(Role::Member);
        let thread = handler
            .start_thread(&author, "Residency match", "Any advice?", Some("careers"))
            .await
            .unwrap();

        let reply = handler.reply(&caller(Role::Member), &thread.id, "Apply early").await.unwrap();
        let detail = handler.get_thread(&thread.id).await.unwrap();
        assert_eq!(detail.thread.thread.reply_count, 1);
        assert_eq!(detail.replies.len(), 1);
        assert_eq!(notifications.list_by_user(&author.id, false).await.unwrap().len(), 1);

        handler.delete_reply(&caller(Role::Admin), &reply.reply.id).await.unwrap();
        let detail = handler.get_thread(&thread.id).await.unwrap();
        assert_eq!(detail.thread.thread.reply_count, 0);
    }

    #[tokio::test]
    async fn locked_thread_refuses_replies() {
        let (handler, _) = handler();
        let thread = handler
            .start_thread(&caller(Role::Member), "Closed topic", "Done", None)
            .await
            .unwrap();
        handler.set_locked(&caller(Role::Editor), &thread.id, true).await.unwrap();

        let err = handler.reply(&caller(Role::Member), &thread.id, "One more").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn members_cannot_pin_or_touch_others_threads() {
        let (handler, _) = handler();
        let thread = handler
            .start_thread(&caller(Role::Member), "Mine", "Body", None)
            .await
            .unwrap();
        let stranger = caller(Role::Member);

        let err = handler.set_pinned(&stranger, &thread.id, true).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = handler.edit_thread(&stranger, &thread.id, "Theirs", "x").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = handler.delete_thread(&stranger, &thread.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn pinned_threads_list_first() {
        let (handler, _) = handler();
        let member = caller(Role::Member);
        let older = handler.start_thread(&member, "Older", "a", None).await.unwrap();
        handler.start_thread(&member, "Newer", "b", None).await.unwrap();
        handler.set_pinned(&caller(Role::Admin), &older.id, true).await.unwrap();

        let page = handler.list_threads(None, Page::default()).await.unwrap();
        assert_eq!(page.items[0].thread.id, older.id);
    }
}
