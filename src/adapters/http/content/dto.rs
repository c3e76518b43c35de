//! Request bodies for community content endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::application::handlers::content::NewsCommand;
use crate::domain::content::EventDetails;
use crate::domain::foundation::{Page, Timestamp, ValidationError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(url)]
    pub image: Option<String>,
    #[serde(default)]
    pub publish: bool,
}

impl From<NewsRequest> for NewsCommand {
    fn from(request: NewsRequest) -> Self {
        NewsCommand {
            title: request.title,
            content: request.content,
            image: request.image,
            publish: request.publish,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListParams {
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    #[validate(range(min = 1))]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub premium_only: bool,
}

impl EventRequest {
    pub fn into_details(self) -> Result<EventDetails, ValidationError> {
        EventDetails::new(
            &self.title,
            &self.description,
            &self.location,
            self.starts_at,
            self.ends_at,
            self.capacity,
            self.premium_only,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadListParams {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ThreadRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplyRequest {
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinRequest {
    pub pinned: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}
