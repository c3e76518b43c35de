//! PostgreSQL implementations of the news, comment, event and forum ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, ensure_affected, parse_column, to_count};
use crate::domain::content::{Comment, Event, ForumReply, ForumThread, News, NewsStatus};
use crate::domain::foundation::{
    CommentId, DomainError, ErrorCode, EventId, NewsId, Page, Paginated, PublicationId, ReplyId,
    ThreadId, Timestamp, UserId,
};
use crate::ports::{CommentRepository, EventRepository, ForumRepository, NewsRepository};

fn non_negative(column: &'static str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::new(ErrorCode::DatabaseError, format!("Negative {} value: {}", column, value))
    })
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

const NEWS_COLUMNS: &str =
    "id, title, content, image, author_id, status, published_at, created_at, updated_at";

pub struct PostgresNewsRepository {
    pool: PgPool,
}

impl PostgresNewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NewsRow {
    id: Uuid,
    title: String,
    content: String,
    image: Option<String>,
    author_id: Uuid,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NewsRow> for News {
    type Error = DomainError;

    fn try_from(row: NewsRow) -> Result<Self, Self::Error> {
        Ok(News {
            id: NewsId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            image: row.image,
            author_id: UserId::from_uuid(row.author_id),
            status: parse_column::<NewsStatus>("status", &row.status)?,
            published_at: row.published_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl NewsRepository for PostgresNewsRepository {
    async fn save(&self, news: &News) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO news (id, title, content, image, author_id, status, published_at, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(news.id.as_uuid())
        .bind(&news.title)
        .bind(&news.content)
        .bind(&news.image)
        .bind(news.author_id.as_uuid())
        .bind(news.status.as_str())
        .bind(news.published_at.map(|t| *t.as_datetime()))
        .bind(news.created_at.as_datetime())
        .bind(news.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save news"))?;
        Ok(())
    }

    async fn update(&self, news: &News) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE news SET title = $2, content = $3, image = $4, status = $5, \
             published_at = $6, updated_at = $7 \
             WHERE id = $1",
        )
        .bind(news.id.as_uuid())
        .bind(&news.title)
        .bind(&news.content)
        .bind(&news.image)
        .bind(news.status.as_str())
        .bind(news.published_at.map(|t| *t.as_datetime()))
        .bind(news.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update news"))?;
        ensure_affected(result.rows_affected(), "News", news.id)
    }

    async fn delete(&self, id: &NewsId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete news"))?;
        ensure_affected(result.rows_affected(), "News", id)
    }

    async fn find_by_id(&self, id: &NewsId) -> Result<Option<News>, DomainError> {
        let row: Option<NewsRow> =
            sqlx::query_as(&format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find news"))?;
        row.map(News::try_from).transpose()
    }

    async fn list(&self, published_only: bool, page: Page) -> Result<Paginated<News>, DomainError> {
        let filter = "(NOT $1 OR status = 'published')";
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM news WHERE {filter}"))
            .bind(published_only)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count news"))?;
        let rows: Vec<NewsRow> = sqlx::query_as(&format!(
            "SELECT {NEWS_COLUMNS} FROM news WHERE {filter} \
             ORDER BY COALESCE(published_at, created_at) DESC LIMIT $2 OFFSET $3"
        ))
        .bind(published_only)
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list news"))?;
        let items = rows.into_iter().map(News::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, to_count(total), page))
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    publication_id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId::from_uuid(row.id),
            publication_id: PublicationId::from_uuid(row.publication_id),
            author_id: UserId::from_uuid(row.author_id),
            content: row.content,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn save(&self, comment: &Comment) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO comments (id, publication_id, author_id, content, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id.as_uuid())
        .bind(comment.publication_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.content)
        .bind(comment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save comment"))?;
        Ok(())
    }

    async fn delete(&self, id: &CommentId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete comment"))?;
        ensure_affected(result.rows_affected(), "Comment", id)
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, DomainError> {
        let row: Option<CommentRow> = sqlx::query_as(
            "SELECT id, publication_id, author_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find comment"))?;
        Ok(row.map(Comment::from))
    }

    async fn list_by_publication(
        &self,
        publication_id: &PublicationId,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT id, publication_id, author_id, content, created_at FROM comments \
             WHERE publication_id = $1 ORDER BY created_at ASC",
        )
        .bind(publication_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list comments"))?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn delete_by_publication(
        &self,
        publication_id: &PublicationId,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE publication_id = $1")
            .bind(publication_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete comments"))?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

const EVENT_COLUMNS: &str = "id, title, description, location, starts_at, ends_at, capacity, \
    premium_only, attendees, created_by, created_at, updated_at";

pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    capacity: Option<i32>,
    premium_only: bool,
    attendees: Vec<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            location: row.location,
            starts_at: Timestamp::from_datetime(row.starts_at),
            ends_at: Timestamp::from_datetime(row.ends_at),
            capacity: row.capacity.map(|c| non_negative("capacity", c)).transpose()?,
            premium_only: row.premium_only,
            attendees: row.attendees.into_iter().map(UserId::from_uuid).collect(),
            created_by: UserId::from_uuid(row.created_by),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn attendee_uuids(event: &Event) -> Vec<Uuid> {
    event.attendees.iter().map(|id| *id.as_uuid()).collect()
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, location, starts_at, ends_at, capacity,
                premium_only, attendees, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at.as_datetime())
        .bind(event.ends_at.as_datetime())
        .bind(event.capacity.map(to_i32))
        .bind(event.premium_only)
        .bind(attendee_uuids(event))
        .bind(event.created_by.as_uuid())
        .bind(event.created_at.as_datetime())
        .bind(event.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save event"))?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE events SET
                title = $2, description = $3, location = $4, starts_at = $5, ends_at = $6,
                capacity = $7, premium_only = $8, attendees = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at.as_datetime())
        .bind(event.ends_at.as_datetime())
        .bind(event.capacity.map(to_i32))
        .bind(event.premium_only)
        .bind(attendee_uuids(event))
        .bind(event.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update event"))?;
        ensure_affected(result.rows_affected(), "Event", event.id)
    }

    async fn delete(&self, id: &EventId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete event"))?;
        ensure_affected(result.rows_affected(), "Event", id)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find event"))?;
        row.map(Event::try_from).transpose()
    }

    async fn list(&self, ending_after: Option<Timestamp>) -> Result<Vec<Event>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1::timestamptz IS NULL OR ends_at >= $1) ORDER BY starts_at ASC"
        ))
        .bind(ending_after.map(|t| *t.as_datetime()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list events"))?;
        rows.into_iter().map(Event::try_from).collect()
    }
}

// ---------------------------------------------------------------------------
// Forum
// ---------------------------------------------------------------------------

const THREAD_COLUMNS: &str = "id, title, body, category, author_id, pinned, locked, reply_count, \
    last_activity_at, created_at, updated_at";

pub struct PostgresForumRepository {
    pool: PgPool,
}

impl PostgresForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ThreadRow {
    id: Uuid,
    title: String,
    body: String,
    category: String,
    author_id: Uuid,
    pinned: bool,
    locked: bool,
    reply_count: i32,
    last_activity_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ThreadRow> for ForumThread {
    type Error = DomainError;

    fn try_from(row: ThreadRow) -> Result<Self, Self::Error> {
        Ok(ForumThread {
            id: ThreadId::from_uuid(row.id),
            title: row.title,
            body: row.body,
            category: row.category,
            author_id: UserId::from_uuid(row.author_id),
            pinned: row.pinned,
            locked: row.locked,
            reply_count: non_negative("reply_count", row.reply_count)?,
            last_activity_at: Timestamp::from_datetime(row.last_activity_at),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReplyRow {
    id: Uuid,
    thread_id: Uuid,
    author_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<ReplyRow> for ForumReply {
    fn from(row: ReplyRow) -> Self {
        ForumReply {
            id: ReplyId::from_uuid(row.id),
            thread_id: ThreadId::from_uuid(row.thread_id),
            author_id: UserId::from_uuid(row.author_id),
            body: row.body,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl ForumRepository for PostgresForumRepository {
    async fn save_thread(&self, thread: &ForumThread) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO forum_threads (id, title, body, category, author_id, pinned, locked,
                reply_count, last_activity_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(thread.id.as_uuid())
        .bind(&thread.title)
        .bind(&thread.body)
        .bind(&thread.category)
        .bind(thread.author_id.as_uuid())
        .bind(thread.pinned)
        .bind(thread.locked)
        .bind(to_i32(thread.reply_count))
        .bind(thread.last_activity_at.as_datetime())
        .bind(thread.created_at.as_datetime())
        .bind(thread.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save thread"))?;
        Ok(())
    }

    async fn update_thread(&self, thread: &ForumThread) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE forum_threads SET
                title = $2, body = $3, category = $4, pinned = $5, locked = $6,
                reply_count = $7, last_activity_at = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(thread.id.as_uuid())
        .bind(&thread.title)
        .bind(&thread.body)
        .bind(&thread.category)
        .bind(thread.pinned)
        .bind(thread.locked)
        .bind(to_i32(thread.reply_count))
        .bind(thread.last_activity_at.as_datetime())
        .bind(thread.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update thread"))?;
        ensure_affected(result.rows_affected(), "Thread", thread.id)
    }

    async fn delete_thread(&self, id: &ThreadId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM forum_threads WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete thread"))?;
        ensure_affected(result.rows_affected(), "Thread", id)
    }

    async fn find_thread(&self, id: &ThreadId) -> Result<Option<ForumThread>, DomainError> {
        let row: Option<ThreadRow> =
            sqlx::query_as(&format!("SELECT {THREAD_COLUMNS} FROM forum_threads WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find thread"))?;
        row.map(ForumThread::try_from).transpose()
    }

    async fn list_threads(
        &self,
        category: Option<&str>,
        page: Page,
    ) -> Result<Paginated<ForumThread>, DomainError> {
        let filter = "($1::text IS NULL OR lower(category) = lower($1))";
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM forum_threads WHERE {filter}"))
                .bind(category)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count threads"))?;
        let rows: Vec<ThreadRow> = sqlx::query_as(&format!(
            "SELECT {THREAD_COLUMNS} FROM forum_threads WHERE {filter} \
             ORDER BY pinned DESC, last_activity_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(category)
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list threads"))?;
        let items = rows
            .into_iter()
            .map(ForumThread::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, to_count(total), page))
    }

    async fn save_reply(&self, reply: &ForumReply) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO forum_replies (id, thread_id, author_id, body, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(reply.id.as_uuid())
        .bind(reply.thread_id.as_uuid())
        .bind(reply.author_id.as_uuid())
        .bind(&reply.body)
        .bind(reply.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save reply"))?;
        Ok(())
    }

    async fn delete_reply(&self, id: &ReplyId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM forum_replies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete reply"))?;
        ensure_affected(result.rows_affected(), "Reply", id)
    }

    async fn find_reply(&self, id: &ReplyId) -> Result<Option<ForumReply>, DomainError> {
        let row: Option<ReplyRow> = sqlx::query_as(
            "SELECT id, thread_id, author_id, body, created_at FROM forum_replies WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find reply"))?;
        Ok(row.map(ForumReply::from))
    }

    async fn list_replies(&self, thread_id: &ThreadId) -> Result<Vec<ForumReply>, DomainError> {
        let rows: Vec<ReplyRow> = sqlx::query_as(
            "SELECT id, thread_id, author_id, body, created_at FROM forum_replies \
             WHERE thread_id = $1 ORDER BY created_at ASC",
        )
        .bind(thread_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list replies"))?;
        Ok(rows.into_iter().map(ForumReply::from).collect())
    }
}
