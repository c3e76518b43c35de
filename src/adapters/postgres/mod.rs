//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresUserRepository`
//! - `PostgresPublicationRepository`
//! - `PostgresSubscriptionRepository`, `PostgresPlanRepository`,
//!   `PostgresPaymentHistoryRepository`
//! - `PostgresNotificationRepository`, `PostgresCommunicationRepository`
//! - `PostgresNewsRepository`, `PostgresCommentRepository`,
//!   `PostgresEventRepository`, `PostgresForumRepository`
//!
//! Profile, plan features, plan snapshots, payment metadata and delivery
//! results are stored as JSONB sub-documents.

mod content;
mod notifications;
mod publications;
mod subscriptions;
mod users;

pub use content::{
    PostgresCommentRepository, PostgresEventRepository, PostgresForumRepository,
    PostgresNewsRepository,
};
pub use notifications::{PostgresCommunicationRepository, PostgresNotificationRepository};
pub use publications::PostgresPublicationRepository;
pub use subscriptions::{
    PostgresPaymentHistoryRepository, PostgresPlanRepository, PostgresSubscriptionRepository,
};
pub use users::PostgresUserRepository;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Opens a connection pool sized by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
}

/// Applies the embedded migrations under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Maps a sqlx error to `DatabaseError`, or `Conflict` on a unique violation.
fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return DomainError::conflict(format!("{}: already exists", context))
                    .with_detail("constraint", db_err.constraint().unwrap_or_default());
            }
        }
        tracing::error!(error = %e, "{}", context);
        DomainError::database(format!("{}: {}", context, e))
    }
}

fn parse_column<T>(column: &'static str, value: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value '{}': {}", column, value, e),
        )
    })
}

fn from_json<T: DeserializeOwned>(
    column: &'static str,
    value: serde_json::Value,
) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} document: {}", column, e),
        )
    })
}

fn to_json<T: serde::Serialize>(
    column: &'static str,
    value: &T,
) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::internal(format!("Failed to encode {}: {}", column, e)))
}

fn ensure_affected(
    rows: u64,
    resource: &'static str,
    id: impl std::fmt::Display,
) -> Result<(), DomainError> {
    if rows == 0 {
        Err(DomainError::not_found(resource, id))
    } else {
        Ok(())
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
