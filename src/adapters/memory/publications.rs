use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{missing, paginate};
use crate::domain::foundation::{DomainError, Paginated, PublicationId, UserId};
use crate::domain::publication::{Publication, PublicationStatus};
use crate::ports::{PublicationQuery, PublicationRepository};

#[derive(Default)]
pub struct InMemoryPublicationRepository {
    publications: RwLock<HashMap<PublicationId, Publication>>,
}

impl InMemoryPublicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(publication: &Publication, query: &PublicationQuery) -> bool {
    let search_ok = query.search.as_ref().map_or(true, |term| {
        let term = term.to_lowercase();
        publication.title.to_lowercase().contains(&term)
            || publication.content.to_lowercase().contains(&term)
    });
    let category_ok = query
        .category
        .as_ref()
        .map_or(true, |c| publication.category.eq_ignore_ascii_case(c));
    search_ok && category_ok
}

#[async_trait]
impl PublicationRepository for InMemoryPublicationRepository {
    async fn save(&self, publication: &Publication) -> Result<(), DomainError> {
        self.publications
            .write()
            .await
            .insert(publication.id, publication.clone());
        Ok(())
    }

    async fn update(&self, publication: &Publication) -> Result<(), DomainError> {
        match self.publications.write().await.get_mut(&publication.id) {
            Some(stored) => {
                *stored = publication.clone();
                Ok(())
            }
            None => Err(missing("Publication", publication.id)),
        }
    }

    async fn delete(&self, id: &PublicationId) -> Result<(), DomainError> {
        self.publications
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing("Publication", id))
    }

    async fn find_by_id(&self, id: &PublicationId) -> Result<Option<Publication>, DomainError> {
        Ok(self.publications.read().await.get(id).cloned())
    }

    async fn list_approved(
        &self,
        query: &PublicationQuery,
    ) -> Result<Paginated<Publication>, DomainError> {
        let mut approved: Vec<Publication> = self
            .publications
            .read()
            .await
            .values()
            .filter(|p| p.status == PublicationStatus::Approved && matches(p, query))
            .cloned()
            .collect();
        approved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(approved, query.page))
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        status: Option<PublicationStatus>,
    ) -> Result<Vec<Publication>, DomainError> {
        let mut mine: Vec<Publication> = self
            .publications
            .read()
            .await
            .values()
            .filter(|p| &p.author_id == author && status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn list_by_status(
        &self,
        status: PublicationStatus,
    ) -> Result<Vec<Publication>, DomainError> {
        let mut queue: Vec<Publication> = self
            .publications
            .read()
            .await
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        queue.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Page;
    use crate::domain::publication::PublicationFields;

    fn approved(title: &str, content: &str, category: &str) -> Publication {
        let fields = PublicationFields::new(title, content, category, None).unwrap();
        let mut p = Publication::create(PublicationId::new(), UserId::new(), fields, false);
        p.approve().unwrap();
        p
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_content() {
        let repo = InMemoryPublicationRepository::new();
        repo.save(&approved("Malaria vaccines", "Field trial", "health")).await.unwrap();
        repo.save(&approved("Soil chemistry", "Nitrogen VACCINE runoff", "agri")).await.unwrap();
        repo.save(&approved("Bridges", "Steel", "engineering")).await.unwrap();

        let query = PublicationQuery {
            search: Some("vaccine".into()),
            ..PublicationQuery::default()
        };
        let page = repo.list_approved(&query).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn pending_publications_are_not_listed_publicly() {
        let repo = InMemoryPublicationRepository::new();
        let fields = PublicationFields::new("Draft idea", "x", "misc", None).unwrap();
        repo.save(&Publication::create(PublicationId::new(), UserId::new(), fields, false))
            .await
            .unwrap();

        let page = repo.list_approved(&PublicationQuery::default()).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(repo.list_by_status(PublicationStatus::Pending).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn category_filter_and_pagination() {
        let repo = InMemoryPublicationRepository::new();
        for i in 0..5 {
            repo.save(&approved(&format!("H{}", i), "b", "Health")).await.unwrap();
        }
        repo.save(&approved("Other", "b", "law")).await.unwrap();

        let query = PublicationQuery {
            category: Some("health".into()),
            page: Page::new(Some(2), Some(2)),
            ..PublicationQuery::default()
        };
        let page = repo.list_approved(&query).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 2);
    }
}
