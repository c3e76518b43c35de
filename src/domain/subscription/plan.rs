//! Subscription plans and billing intervals.
//!
//! Prices are integer minor units (kobo, cents) together with an ISO 4217
//! currency code. Floats never appear in stored amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    required_text, DomainError, PlanId, Timestamp, ValidationError,
};

use super::Tier;

/// How often a plan bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
        }
    }

    /// End of a period starting at `start`, in calendar months or years.
    pub fn period_end(&self, start: Timestamp) -> Timestamp {
        match self {
            BillingInterval::Monthly => start.add_months(1),
            BillingInterval::Yearly => start.add_years(1),
        }
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingInterval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BillingInterval::Monthly),
            "yearly" | "annually" => Ok(BillingInterval::Yearly),
            other => Err(ValidationError::invalid_format(
                "interval",
                format!("unknown billing interval '{}'", other),
            )),
        }
    }
}

/// Uppercase three-letter currency code.
pub fn normalize_currency(code: &str) -> Result<String, ValidationError> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(ValidationError::invalid_format(
            "currency",
            "expected a three-letter ISO 4217 code",
        ))
    }
}

/// Copy of the plan terms stored on a subscription when it is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub name: String,
    pub price_minor: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Lowercase; doubles as the tier name.
    pub name: String,
    pub gateway_plan_id: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub features: Vec<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New plan terms supplied by an admin.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub gateway_plan_id: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub features: Vec<String>,
}

/// Changes an admin may apply to an existing plan.
///
/// Features are only ever appended. Price and interval may change only while
/// no subscription references the plan.
#[derive(Debug, Clone, Default)]
pub struct PlanEdit {
    pub name: Option<String>,
    pub add_features: Vec<String>,
    pub active: Option<bool>,
    pub price_minor: Option<i64>,
    pub interval: Option<BillingInterval>,
}

impl Plan {
    pub fn create(id: PlanId, new: NewPlan) -> Result<Self, ValidationError> {
        let now = Timestamp::now();
        Ok(Self {
            id,
            name: plan_name(&new.name)?,
            gateway_plan_id: new
                .gateway_plan_id
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            price_minor: positive_price(new.price_minor)?,
            currency: normalize_currency(&new.currency)?,
            interval: new.interval,
            features: clean_features(new.features)?,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies an edit. `referenced` tells whether any subscription points at
    /// this plan, which freezes the billing terms.
    pub fn apply_edit(&mut self, edit: PlanEdit, referenced: bool) -> Result<(), DomainError> {
        let changes_terms = edit.price_minor.is_some_and(|p| p != self.price_minor)
            || edit.interval.is_some_and(|i| i != self.interval);
        if changes_terms && referenced {
            return Err(DomainError::conflict(
                "Price and interval are fixed once a subscription uses this plan",
            )
            .with_detail("plan_id", self.id.to_string()));
        }

        if let Some(name) = edit.name {
            self.name = plan_name(&name)?;
        }
        if let Some(price) = edit.price_minor {
            self.price_minor = positive_price(price)?;
        }
        if let Some(interval) = edit.interval {
            self.interval = interval;
        }
        for feature in clean_features(edit.add_features)? {
            if !self.features.contains(&feature) {
                self.features.push(feature);
            }
        }
        if let Some(active) = edit.active {
            self.active = active;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Timestamp::now();
    }

    pub fn tier(&self) -> Tier {
        // Names are validated as tiers on the way in.
        Tier::parse(&self.name).unwrap_or_else(|_| Tier::free())
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            name: self.name.clone(),
            price_minor: self.price_minor,
            currency: self.currency.clone(),
            interval: self.interval,
            features: self.features.clone(),
        }
    }
}

fn plan_name(name: &str) -> Result<String, ValidationError> {
    let tier = Tier::parse(name)?;
    if tier.is_free() {
        return Err(ValidationError::invalid_format(
            "name",
            "'free' is reserved for the free tier",
        ));
    }
    Ok(tier.as_str().to_string())
}

fn positive_price(price_minor: i64) -> Result<i64, ValidationError> {
    if price_minor > 0 {
        Ok(price_minor)
    } else {
        Err(ValidationError::invalid_format(
            "price",
            "must be a positive amount in minor units",
        ))
    }
}

fn clean_features(features: Vec<String>) -> Result<Vec<String>, ValidationError> {
    features
        .iter()
        .map(|f| required_text("features", f, 200))
        .collect()
}
