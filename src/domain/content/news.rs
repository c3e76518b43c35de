//! Association news posts.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{
    required_text, NewsId, OwnedByUser, Timestamp, UserId, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Draft,
    Published,
}

impl NewsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Draft => "draft",
            NewsStatus::Published => "published",
        }
    }
}

impl FromStr for NewsStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(NewsStatus::Draft),
            "published" => Ok(NewsStatus::Published),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown news status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFields {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

impl NewsFields {
    pub fn new(title: &str, content: &str, image: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text("title", title, 200)?,
            content: required_text("content", content, 100_000)?,
            image: image.filter(|i| !i.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub author_id: UserId,
    pub status: NewsStatus,
    /// Set the first time the post is published and kept afterwards.
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl News {
    pub fn create(author_id: UserId, fields: NewsFields, publish: bool) -> Self {
        let now = Timestamp::now();
        let mut news = Self {
            id: NewsId::new(),
            title: fields.title,
            content: fields.content,
            image: fields.image,
            author_id,
            status: NewsStatus::Draft,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        if publish {
            news.publish();
        }
        news
    }

    pub fn update(&mut self, fields: NewsFields) {
        self.title = fields.title;
        self.content = fields.content;
        self.image = fields.image;
        self.updated_at = Timestamp::now();
    }

    pub fn publish(&mut self) {
        let now = Timestamp::now();
        self.status = NewsStatus::Published;
        self.published_at.get_or_insert(now);
        self.updated_at = now;
    }

    pub fn unpublish(&mut self) {
        self.status = NewsStatus::Draft;
        self.updated_at = Timestamp::now();
    }

    pub fn is_public(&self) -> bool {
        self.status == NewsStatus::Published
    }
}

impl OwnedByUser for News {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewsFields {
        NewsFields::new("Council elected", "Results of the vote", None).unwrap()
    }

    #[test]
    fn draft_is_not_public() {
        let news = News::create(UserId::new(), fields(), false);
        assert!(!news.is_public());
        assert!(news.published_at.is_none());
    }

    #[test]
    fn republishing_keeps_first_publication_date() {
        let mut news = News::create(UserId::new(), fields(), true);
        let first = news.published_at;
        news.unpublish();
        news.publish();
        assert!(news.is_public());
        assert_eq!(news.published_at, first);
    }
}
