//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, ensure_affected, from_json, parse_column, to_count, to_json};
use crate::domain::foundation::{DomainError, Page, Paginated, Role, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

const COLUMNS: &str =
    "id, name, email, password_hash, role, verified, profile, professional, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: Option<String>,
    role: String,
    verified: bool,
    profile: serde_json::Value,
    professional: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: parse_column::<Role>("role", &row.role)?,
            verified: row.verified,
            profile: from_json("profile", row.profile)?,
            professional: from_json("professional", row.professional)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, DomainError> {
    rows.into_iter().map(User::try_from).collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, verified, profile,
                professional, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.verified)
        .bind(to_json("profile", &user.profile)?)
        .bind(to_json("professional", &user.professional)?)
        .bind(user.created_at.as_datetime())
        .bind(user.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create user"))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2, email = $3, password_hash = $4, role = $5, verified = $6,
                profile = $7, professional = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.verified)
        .bind(to_json("profile", &user.profile)?)
        .bind(to_json("professional", &user.professional)?)
        .bind(user.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update user"))?;
        ensure_affected(result.rows_affected(), "User", user.id)
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        ensure_affected(result.rows_affected(), "User", id)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find user"))?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find user"))?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ANY($1)"))
                .bind(uuids)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to load users"))?;
        into_users(rows)
    }

    async fn list(&self, page: Page) -> Result<Paginated<User>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))?;
        Ok(Paginated::new(into_users(rows)?, to_count(total), page))
    }

    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, DomainError> {
        let roles: Vec<&str> = roles.iter().map(Role::as_str).collect();
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE role = ANY($1)"))
                .bind(roles)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to list users by role"))?;
        into_users(rows)
    }
}
