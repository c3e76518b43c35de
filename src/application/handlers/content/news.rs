//! News posts. Writes are admin/editor only; drafts are hidden from
//! everyone else.

use std::sync::Arc;

use crate::domain::content::{News, NewsFields};
use crate::domain::foundation::{AuthenticatedUser, DomainError, NewsId, Page, Paginated};
use crate::ports::NewsRepository;

#[derive(Debug, Clone)]
pub struct NewsCommand {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub publish: bool,
}

pub struct NewsHandler {
    news: Arc<dyn NewsRepository>,
}

fn can_see_drafts(viewer: Option<&AuthenticatedUser>) -> bool {
    viewer.is_some_and(AuthenticatedUser::is_privileged)
}

impl NewsHandler {
    pub fn new(news: Arc<dyn NewsRepository>) -> Self {
        Self { news }
    }

    pub async fn list(
        &self,
        viewer: Option<&AuthenticatedUser>,
        page: Page,
    ) -> Result<Paginated<News>, DomainError> {
        self.news.list(!can_see_drafts(viewer), page).await
    }

    /// Drafts read as `NotFound` for non-privileged callers.
    pub async fn get(
        &self,
        id: &NewsId,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<News, DomainError> {
        self.news
            .find_by_id(id)
            .await?
            .filter(|n| n.is_public() || can_see_drafts(viewer))
            .ok_or_else(|| DomainError::not_found("News", id))
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        cmd: NewsCommand,
    ) -> Result<News, DomainError> {
        actor.require_privileged()?;
        let fields = NewsFields::new(&cmd.title, &cmd.content, cmd.image)?;
        let news = News::create(actor.id, fields, cmd.publish);
        self.news.save(&news).await?;
        tracing::info!(news_id = %news.id, status = news.status.as_str(), "news created");
        Ok(news)
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: &NewsId,
        cmd: NewsCommand,
    ) -> Result<News, DomainError> {
        actor.require_privileged()?;
        let mut news = self.get(id, Some(actor)).await?;
        news.update(NewsFields::new(&cmd.title, &cmd.content, cmd.image)?);
        if cmd.publish {
            news.publish();
        } else {
            news.unpublish();
        }
        self.news.update(&news).await?;
        Ok(news)
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: &NewsId) -> Result<(), DomainError> {
        actor.require_privileged()?;
        self.news.delete(id).await?;
        tracing::info!(news_id = %id, "news deleted");
        Ok(())
    }
}
