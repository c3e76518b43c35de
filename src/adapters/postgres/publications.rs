//! PostgreSQL implementation of PublicationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, ensure_affected, parse_column, to_count};
use crate::domain::foundation::{DomainError, Paginated, PublicationId, Timestamp, UserId};
use crate::domain::publication::{Publication, PublicationStatus};
use crate::ports::{PublicationQuery, PublicationRepository};

const COLUMNS: &str = "id, title, content, category, image, author_id, status, \
    rejection_reason, created_at, updated_at";

pub struct PostgresPublicationRepository {
    pool: PgPool,
}

impl PostgresPublicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PublicationRow {
    id: Uuid,
    title: String,
    content: String,
    category: String,
    image: Option<String>,
    author_id: Uuid,
    status: String,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PublicationRow> for Publication {
    type Error = DomainError;

    fn try_from(row: PublicationRow) -> Result<Self, Self::Error> {
        Ok(Publication {
            id: PublicationId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            category: row.category,
            image: row.image,
            author_id: UserId::from_uuid(row.author_id),
            status: parse_column::<PublicationStatus>("status", &row.status)?,
            rejection_reason: row.rejection_reason,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn into_publications(rows: Vec<PublicationRow>) -> Result<Vec<Publication>, DomainError> {
    rows.into_iter().map(Publication::try_from).collect()
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl PublicationRepository for PostgresPublicationRepository {
    async fn save(&self, publication: &Publication) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO publications (id, title, content, category, image, author_id, status,
                rejection_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(publication.id.as_uuid())
        .bind(&publication.title)
        .bind(&publication.content)
        .bind(&publication.category)
        .bind(&publication.image)
        .bind(publication.author_id.as_uuid())
        .bind(publication.status.as_str())
        .bind(&publication.rejection_reason)
        .bind(publication.created_at.as_datetime())
        .bind(publication.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save publication"))?;
        Ok(())
    }

    async fn update(&self, publication: &Publication) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE publications SET
                title = $2, content = $3, category = $4, image = $5,
                status = $6, rejection_reason = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(publication.id.as_uuid())
        .bind(&publication.title)
        .bind(&publication.content)
        .bind(&publication.category)
        .bind(&publication.image)
        .bind(publication.status.as_str())
        .bind(&publication.rejection_reason)
        .bind(publication.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update publication"))?;
        ensure_affected(result.rows_affected(), "Publication", publication.id)
    }

    async fn delete(&self, id: &PublicationId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM publications WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete publication"))?;
        ensure_affected(result.rows_affected(), "Publication", id)
    }

    async fn find_by_id(&self, id: &PublicationId) -> Result<Option<Publication>, DomainError> {
        let row: Option<PublicationRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM publications WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find publication"))?;
        row.map(Publication::try_from).transpose()
    }

    async fn list_approved(
        &self,
        query: &PublicationQuery,
    ) -> Result<Paginated<Publication>, DomainError> {
        let search = query.search.as_deref().map(like_pattern);
        let filter = r#"
            status = 'approved'
            AND ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1)
            AND ($2::text IS NULL OR lower(category) = lower($2))
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM publications WHERE {filter}"))
                .bind(&search)
                .bind(&query.category)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count publications"))?;

        let rows: Vec<PublicationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM publications WHERE {filter} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(&search)
        .bind(&query.category)
        .bind(i64::from(query.page.size()))
        .bind(query.page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list publications"))?;

        Ok(Paginated::new(into_publications(rows)?, to_count(total), query.page))
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        status: Option<PublicationStatus>,
    ) -> Result<Vec<Publication>, DomainError> {
        let rows: Vec<PublicationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM publications \
             WHERE author_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(author.as_uuid())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list publications"))?;
        into_publications(rows)
    }

    async fn list_by_status(
        &self,
        status: PublicationStatus,
    ) -> Result<Vec<Publication>, DomainError> {
        let rows: Vec<PublicationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM publications WHERE status = $1 ORDER BY created_at ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list publications"))?;
        into_publications(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }
}
