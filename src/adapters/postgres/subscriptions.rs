//! PostgreSQL implementations of SubscriptionRepository, PlanRepository and
//! PaymentHistoryRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, ensure_affected, from_json, parse_column, to_count, to_json};
use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, PlanId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::subscription::{
    BillingInterval, PaymentRecord, PaymentStatus, PaymentType, Plan, PlanSnapshot, Subscription,
    SubscriptionStatus, Tier,
};
use crate::ports::{PaymentHistoryRepository, PlanRepository, SubscriptionRepository};

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_id, tier, status, start_date, end_date, \
    gateway_subscription_id, checkout_reference, plan_snapshot, created_at, updated_at";

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        filter: &str,
        value: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE {filter} = $1 \
             ORDER BY updated_at DESC LIMIT 1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find subscription"))?;
        row.map(Subscription::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: Option<Uuid>,
    tier: String,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    gateway_subscription_id: Option<String>,
    checkout_reference: Option<String>,
    plan_snapshot: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let tier = Tier::parse(&row.tier).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid tier value: {}", e))
        })?;
        let plan_snapshot = row
            .plan_snapshot
            .map(|doc| from_json::<PlanSnapshot>("plan_snapshot", doc))
            .transpose()?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan_id: row.plan_id.map(PlanId::from_uuid),
            tier,
            status: parse_column::<SubscriptionStatus>("status", &row.status)?,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            gateway_subscription_id: row.gateway_subscription_id,
            checkout_reference: row.checkout_reference,
            plan_snapshot,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn snapshot_json(subscription: &Subscription) -> Result<Option<serde_json::Value>, DomainError> {
    subscription
        .plan_snapshot
        .as_ref()
        .map(|s| to_json("plan_snapshot", s))
        .transpose()
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, tier, status, start_date, end_date,
                gateway_subscription_id, checkout_reference, plan_snapshot, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.plan_id.map(|p| *p.as_uuid()))
        .bind(subscription.tier.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.as_datetime())
        .bind(&subscription.gateway_subscription_id)
        .bind(&subscription.checkout_reference)
        .bind(snapshot_json(subscription)?)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save subscription"))?;
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $2, tier = $3, status = $4, start_date = $5, end_date = $6,
                gateway_subscription_id = $7, checkout_reference = $8, plan_snapshot = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.plan_id.map(|p| *p.as_uuid()))
        .bind(subscription.tier.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.as_datetime())
        .bind(&subscription.gateway_subscription_id)
        .bind(&subscription.checkout_reference)
        .bind(snapshot_json(subscription)?)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update subscription"))?;
        ensure_affected(result.rows_affected(), "Subscription", subscription.id)
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find subscription"))?;
        row.map(Subscription::try_from).transpose()
    }

    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = $1 AND status = 'active' ORDER BY updated_at DESC LIMIT 1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find subscription"))?;
        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_gateway_subscription_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.find_one("gateway_subscription_id", gateway_subscription_id)
            .await
    }

    async fn find_by_checkout_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.find_one("checkout_reference", reference).await
    }

    async fn list_active_user_ids(&self, now: Timestamp) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT user_id FROM subscriptions WHERE status = 'active' AND end_date >= $1",
        )
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list subscribers"))?;
        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn count_by_plan(&self, plan_id: &PlanId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE plan_id = $1")
            .bind(plan_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count subscriptions"))?;
        Ok(to_count(count))
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

const PLAN_COLUMNS: &str = "id, name, gateway_plan_id, price_minor, currency, billing_interval, \
    features, active, created_at, updated_at";

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    gateway_plan_id: Option<String>,
    price_minor: i64,
    currency: String,
    billing_interval: String,
    features: serde_json::Value,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(Plan {
            id: PlanId::from_uuid(row.id),
            name: row.name,
            gateway_plan_id: row.gateway_plan_id,
            price_minor: row.price_minor,
            currency: row.currency,
            interval: parse_column::<BillingInterval>("billing_interval", &row.billing_interval)?,
            features: from_json("features", row.features)?,
            active: row.active,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn into_plans(rows: Vec<PlanRow>) -> Result<Vec<Plan>, DomainError> {
    rows.into_iter().map(Plan::try_from).collect()
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn save(&self, plan: &Plan) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO plans (id, name, gateway_plan_id, price_minor, currency,
                billing_interval, features, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(plan.id.as_uuid())
        .bind(&plan.name)
        .bind(&plan.gateway_plan_id)
        .bind(plan.price_minor)
        .bind(&plan.currency)
        .bind(plan.interval.as_str())
        .bind(to_json("features", &plan.features)?)
        .bind(plan.active)
        .bind(plan.created_at.as_datetime())
        .bind(plan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save plan"))?;
        Ok(())
    }

    async fn update(&self, plan: &Plan) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE plans SET
                name = $2, gateway_plan_id = $3, price_minor = $4, currency = $5,
                billing_interval = $6, features = $7, active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(plan.id.as_uuid())
        .bind(&plan.name)
        .bind(&plan.gateway_plan_id)
        .bind(plan.price_minor)
        .bind(&plan.currency)
        .bind(plan.interval.as_str())
        .bind(to_json("features", &plan.features)?)
        .bind(plan.active)
        .bind(plan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update plan"))?;
        ensure_affected(result.rows_affected(), "Plan", plan.id)
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> =
            sqlx::query_as(&format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find plan"))?;
        row.map(Plan::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE lower(name) = lower($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find plan"))?;
        row.map(Plan::try_from).transpose()
    }

    async fn find_by_price(
        &self,
        price_minor: i64,
        currency: &str,
    ) -> Result<Vec<Plan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans \
             WHERE active AND price_minor = $1 AND upper(currency) = upper($2)"
        ))
        .bind(price_minor)
        .bind(currency)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find plans by price"))?;
        into_plans(rows)
    }

    async fn list(&self, include_inactive: bool) -> Result<Vec<Plan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE ($1 OR active) \
             ORDER BY price_minor ASC, name ASC"
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list plans"))?;
        into_plans(rows)
    }
}

// ---------------------------------------------------------------------------
// Payment history
// ---------------------------------------------------------------------------

const PAYMENT_COLUMNS: &str = "id, user_id, payment_type, transaction_id, amount_minor, \
    currency, status, metadata, created_at";

pub struct PostgresPaymentHistoryRepository {
    pool: PgPool,
}

impl PostgresPaymentHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    payment_type: String,
    transaction_id: String,
    amount_minor: i64,
    currency: String,
    status: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            payment_type: parse_column::<PaymentType>("payment_type", &row.payment_type)?,
            transaction_id: row.transaction_id,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status: parse_column::<PaymentStatus>("status", &row.status)?,
            metadata: row.metadata,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl PaymentHistoryRepository for PostgresPaymentHistoryRepository {
    async fn append(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_history (id, user_id, payment_type, transaction_id,
                amount_minor, currency, status, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(record.payment_type.as_str())
        .bind(&record.transaction_id)
        .bind(record.amount_minor)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .bind(&record.metadata)
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record payment"))?;
        Ok(())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_history WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find payment"))?;
        row.map(PaymentRecord::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_history \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list payments"))?;
        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}
