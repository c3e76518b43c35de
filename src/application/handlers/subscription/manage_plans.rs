//! Plan catalogue. Reads are public, writes are admin-only.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, DomainError, PlanId};
use crate::domain::subscription::{BillingInterval, NewPlan, Plan, PlanEdit, SubscriptionError};
use crate::ports::{PlanRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CreatePlanCommand {
    pub name: String,
    pub gateway_plan_id: Option<String>,
    pub price_minor: i64,
    /// Falls back to the configured default currency.
    pub currency: Option<String>,
    pub interval: BillingInterval,
    pub features: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePlanCommand {
    pub id: PlanId,
    pub edit: PlanEdit,
}

pub struct ManagePlansHandler {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    default_currency: String,
}

impl ManagePlansHandler {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            plans,
            subscriptions,
            default_currency: default_currency.into(),
        }
    }

    pub async fn list_active(&self) -> Result<Vec<Plan>, DomainError> {
        self.plans.list(false).await
    }

    pub async fn list_all(&self, actor: &AuthenticatedUser) -> Result<Vec<Plan>, DomainError> {
        actor.require_admin()?;
        self.plans.list(true).await
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        cmd: CreatePlanCommand,
    ) -> Result<Plan, DomainError> {
        actor.require_admin()?;
        let plan = Plan::create(
            PlanId::new(),
            NewPlan {
                name: cmd.name,
                gateway_plan_id: cmd.gateway_plan_id,
                price_minor: cmd.price_minor,
                currency: cmd.currency.unwrap_or_else(|| self.default_currency.clone()),
                interval: cmd.interval,
                features: cmd.features,
            },
        )?;
        self.plans.save(&plan).await?;
        tracing::info!(
            plan_id = %plan.id,
            name = %plan.name,
            price_minor = plan.price_minor,
            "plan created"
        );
        Ok(plan)
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        cmd: UpdatePlanCommand,
    ) -> Result<Plan, DomainError> {
        actor.require_admin()?;
        let mut plan = self.find(&cmd.id).await?;
        let referenced = self.subscriptions.count_by_plan(&plan.id).await? > 0;
        plan.apply_edit(cmd.edit, referenced)?;
        self.plans.update(&plan).await?;
        tracing::info!(plan_id = %plan.id, "plan updated");
        Ok(plan)
    }

    /// Hides the plan from the catalogue. Existing subscriptions keep their
    /// snapshot.
    pub async fn deactivate(
        &self,
        actor: &AuthenticatedUser,
        id: &PlanId,
    ) -> Result<Plan, DomainError> {
        actor.require_admin()?;
        let mut plan = self.find(id).await?;
        plan.deactivate();
        self.plans.update(&plan).await?;
        tracing::info!(plan_id = %plan.id, "plan deactivated");
        Ok(plan)
    }

    async fn find(&self, id: &PlanId) -> Result<Plan, DomainError> {
        Ok(self
            .plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| SubscriptionError::PlanNotFound(id.to_string()))?)
    }
}
