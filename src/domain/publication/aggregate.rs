//! Publication aggregate.
//!
//! # Invariants
//!
//! - title, content and category are trimmed and non-empty; title is at most
//!   200 characters
//! - the author may edit or delete only while status is not `approved`
//! - every author edit puts the publication back in the moderation queue
//! - non-approved publications are visible to the author and to privileged
//!   roles only

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    required_text, AuthenticatedUser, DomainError, ErrorCode, OwnedByUser, PublicationId,
    StateMachine, Timestamp, UserId, ValidationError,
};

use super::PublicationStatus;

pub const MAX_TITLE_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 80;
const MAX_CONTENT_LEN: usize = 100_000;

/// Validated author-supplied fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationFields {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
}

impl PublicationFields {
    pub fn new(
        title: &str,
        content: &str,
        category: &str,
        image: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text("title", title, MAX_TITLE_LEN)?,
            content: required_text("content", content, MAX_CONTENT_LEN)?,
            category: required_text("category", category, MAX_CATEGORY_LEN)?,
            image: image
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
    pub author_id: UserId,
    pub status: PublicationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Publication {
    /// Creates a publication submitted for review, or a draft if requested.
    pub fn create(
        id: PublicationId,
        author_id: UserId,
        fields: PublicationFields,
        draft: bool,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            title: fields.title,
            content: fields.content,
            category: fields.category,
            image: fields.image,
            author_id,
            status: if draft {
                PublicationStatus::Draft
            } else {
                PublicationStatus::Pending
            },
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_visible_to(&self, viewer: Option<&AuthenticatedUser>) -> bool {
        if self.status == PublicationStatus::Approved {
            return true;
        }
        viewer.is_some_and(|v| v.is_privileged() || self.is_owner(&v.id))
    }

    /// `Forbidden` unless `is_visible_to` holds.
    pub fn check_visible_to(&self, viewer: Option<&AuthenticatedUser>) -> Result<(), DomainError> {
        if self.is_visible_to(viewer) {
            Ok(())
        } else {
            Err(DomainError::forbidden("This publication is not available")
                .with_detail("publication_id", self.id.to_string()))
        }
    }

    /// Author edit. Replaces the fields and resubmits for review.
    pub fn revise(
        &mut self,
        editor: &UserId,
        fields: PublicationFields,
    ) -> Result<(), DomainError> {
        self.check_author_mutable(editor)?;
        self.status = self.status.transition_to(PublicationStatus::Pending)?;
        self.title = fields.title;
        self.content = fields.content;
        self.category = fields.category;
        self.image = fields.image;
        self.rejection_reason = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Checks the author may delete this publication.
    pub fn check_deletable_by(&self, user: &UserId) -> Result<(), DomainError> {
        self.check_author_mutable(user)
    }

    /// Marks the publication approved. Re-approving overwrites silently.
    pub fn approve(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(PublicationStatus::Approved)?;
        self.rejection_reason = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn reject(&mut self, reason: Option<String>) -> Result<(), DomainError> {
        self.status = self.status.transition_to(PublicationStatus::Rejected)?;
        self.rejection_reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn check_author_mutable(&self, user: &UserId) -> Result<(), DomainError> {
        self.check_ownership(user)?;
        if !self.status.is_author_mutable() {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Approved publications can no longer be changed by the author",
            )
            .with_detail("publication_id", self.id.to_string()));
        }
        Ok(())
    }
}

impl OwnedByUser for Publication {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}
