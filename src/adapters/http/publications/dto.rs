//! Request bodies and query strings for publication endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::foundation::{Page, ValidationError};
use crate::domain::publication::PublicationStatus;
use crate::ports::PublicationQuery;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublicationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(min = 1, max = 80))]
    pub category: String,
    #[validate(url)]
    pub image: Option<String>,
    /// Only honoured on create.
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPublicationsParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<ListPublicationsParams> for PublicationQuery {
    fn from(params: ListPublicationsParams) -> Self {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        PublicationQuery {
            search: non_blank(params.search),
            category: non_blank(params.category),
            page: Page::new(params.page, params.limit),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MineParams {
    pub status: Option<String>,
}

impl MineParams {
    pub fn status(&self) -> Result<Option<PublicationStatus>, ValidationError> {
        self.status.as_deref().map(str::parse).transpose()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
}
