//! Comments on approved publications.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    required_text, CommentId, OwnedByUser, PublicationId, Timestamp, UserId, ValidationError,
};

pub const MAX_COMMENT_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub publication_id: PublicationId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Timestamp,
}

impl Comment {
    pub fn new(
        publication_id: PublicationId,
        author_id: UserId,
        content: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: CommentId::new(),
            publication_id,
            author_id,
            content: required_text("content", content, MAX_COMMENT_LEN)?,
            created_at: Timestamp::now(),
        })
    }
}

impl OwnedByUser for Comment {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}
