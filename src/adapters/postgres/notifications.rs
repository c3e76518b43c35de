//! PostgreSQL implementations of NotificationRepository and CommunicationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, ensure_affected, from_json, parse_column, to_json};
use crate::domain::foundation::{
    CommunicationId, DomainError, ErrorCode, NotificationId, Timestamp, UserId,
};
use crate::domain::notification::{
    CommunicationRecord, DeliveryStatus, Notification, NotificationType,
};
use crate::ports::{CommunicationRepository, NotificationRepository};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, kind, read, created_at";

pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message: String,
    kind: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            title: row.title,
            message: row.message,
            kind: parse_column::<NotificationType>("kind", &row.kind)?,
            read: row.read,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn save(&self, notification: &Notification) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, title, message, kind, read, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(notification.id.as_uuid())
        .bind(notification.user_id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.read)
        .bind(notification.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save notification"))?;
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE notifications SET title = $2, message = $3, read = $4 WHERE id = $1",
        )
        .bind(notification.id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.read)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update notification"))?;
        ensure_affected(result.rows_affected(), "Notification", notification.id)
    }

    async fn delete(&self, id: &NotificationId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete notification"))?;
        ensure_affected(result.rows_affected(), "Notification", id)
    }

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError> {
        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find notification"))?;
        row.map(Notification::try_from).transpose()
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 AND (NOT $2 OR NOT read) ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list notifications"))?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to mark notifications read"))?;
        Ok(result.rows_affected())
    }
}

const COMMUNICATION_COLUMNS: &str = "id, sender_id, subject, content, recipient_count, results, \
    delivery_status, sent_count, failed_count, created_at";

pub struct PostgresCommunicationRepository {
    pool: PgPool,
}

impl PostgresCommunicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommunicationRow {
    id: Uuid,
    sender_id: Uuid,
    subject: String,
    content: String,
    recipient_count: i32,
    results: serde_json::Value,
    delivery_status: String,
    sent_count: i32,
    failed_count: i32,
    created_at: DateTime<Utc>,
}

fn to_u32(column: &'static str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::new(ErrorCode::DatabaseError, format!("Negative {} value: {}", column, value))
    })
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl TryFrom<CommunicationRow> for CommunicationRecord {
    type Error = DomainError;

    fn try_from(row: CommunicationRow) -> Result<Self, Self::Error> {
        let delivery_status = DeliveryStatus::parse(&row.delivery_status).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, e.to_string())
        })?;
        Ok(CommunicationRecord {
            id: CommunicationId::from_uuid(row.id),
            sender_id: UserId::from_uuid(row.sender_id),
            subject: row.subject,
            content: row.content,
            recipient_count: to_u32("recipient_count", row.recipient_count)?,
            results: from_json("results", row.results)?,
            delivery_status,
            sent_count: to_u32("sent_count", row.sent_count)?,
            failed_count: to_u32("failed_count", row.failed_count)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl CommunicationRepository for PostgresCommunicationRepository {
    async fn save(&self, record: &CommunicationRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO communications (id, sender_id, subject, content, recipient_count,
                results, delivery_status, sent_count, failed_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.sender_id.as_uuid())
        .bind(&record.subject)
        .bind(&record.content)
        .bind(to_i32(record.recipient_count))
        .bind(to_json("results", &record.results)?)
        .bind(record.delivery_status.as_str())
        .bind(to_i32(record.sent_count))
        .bind(to_i32(record.failed_count))
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save communication"))?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CommunicationId,
    ) -> Result<Option<CommunicationRecord>, DomainError> {
        let row: Option<CommunicationRow> = sqlx::query_as(&format!(
            "SELECT {COMMUNICATION_COLUMNS} FROM communications WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find communication"))?;
        row.map(CommunicationRecord::try_from).transpose()
    }

    async fn list(&self, limit: u32) -> Result<Vec<CommunicationRecord>, DomainError> {
        let rows: Vec<CommunicationRow> = sqlx::query_as(&format!(
            "SELECT {COMMUNICATION_COLUMNS} FROM communications ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list communications"))?;
        rows.into_iter().map(CommunicationRecord::try_from).collect()
    }
}
