//! Discussion forum threads and replies.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    required_text, DomainError, OwnedByUser, ReplyId, ThreadId, Timestamp, UserId,
    ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumThread {
    pub id: ThreadId,
    pub title: String,
    pub body: String,
    pub category: String,
    pub author_id: UserId,
    pub pinned: bool,
    pub locked: bool,
    pub reply_count: u32,
    pub last_activity_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumReply {
    pub id: ReplyId,
    pub thread_id: ThreadId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: Timestamp,
}

impl ForumThread {
    pub fn start(
        author_id: UserId,
        title: &str,
        body: &str,
        category: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let now = Timestamp::now();
        Ok(Self {
            id: ThreadId::new(),
            title: required_text("title", title, 200)?,
            body: required_text("body", body, 20_000)?,
            category: match category {
                Some(c) if !c.trim().is_empty() => required_text("category", c, 80)?,
                _ => "general".to_string(),
            },
            author_id,
            pinned: false,
            locked: false,
            reply_count: 0,
            last_activity_at: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates a reply and bumps the thread's counters. A locked thread
    /// rejects replies with `Forbidden`.
    pub fn reply(&mut self, author_id: UserId, body: &str) -> Result<ForumReply, DomainError> {
        if self.locked {
            return Err(DomainError::forbidden("This thread is locked")
                .with_detail("thread_id", self.id.to_string()));
        }
        let reply = ForumReply {
            id: ReplyId::new(),
            thread_id: self.id,
            author_id,
            body: required_text("body", body, 20_000)?,
            created_at: Timestamp::now(),
        };
        self.reply_count += 1;
        self.last_activity_at = reply.created_at;
        self.updated_at = reply.created_at;
        Ok(reply)
    }

    /// Author edit of the opening post.
    pub fn edit(&mut self, title: &str, body: &str) -> Result<(), ValidationError> {
        self.title = required_text("title", title, 200)?;
        self.body = required_text("body", body, 20_000)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn reply_removed(&mut self) {
        self.reply_count = self.reply_count.saturating_sub(1);
        self.updated_at = Timestamp::now();
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
        self.updated_at = Timestamp::now();
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.updated_at = Timestamp::now();
    }
}

impl OwnedByUser for ForumThread {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}

impl OwnedByUser for ForumReply {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}
