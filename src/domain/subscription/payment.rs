//! Payment history entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{PaymentId, Timestamp, UserId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Subscription,
    Donation,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Successful,
    Failed,
    Pending,
}

macro_rules! wire_enum {
    ($ty:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($ty::$variant),)+
                    other => Err(ValidationError::invalid_format(
                        stringify!($ty),
                        format!("unknown value '{}'", other),
                    )),
                }
            }
        }
    };
}

wire_enum!(PaymentType {
    Subscription => "subscription",
    Donation => "donation",
    Event => "event",
});

wire_enum!(PaymentStatus {
    Successful => "successful",
    Failed => "failed",
    Pending => "pending",
});

/// Append-only record of one gateway transaction.
///
/// `transaction_id` is unique across the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub user_id: UserId,
    pub payment_type: PaymentType,
    pub transaction_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

impl PaymentRecord {
    pub fn successful_subscription(
        user_id: UserId,
        transaction_id: impl Into<String>,
        amount_minor: i64,
        currency: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            user_id,
            payment_type: PaymentType::Subscription,
            transaction_id: transaction_id.into(),
            amount_minor,
            currency: currency.into(),
            status: PaymentStatus::Successful,
            metadata,
            created_at: Timestamp::now(),
        }
    }
}

/// Converts a gateway major-unit amount (e.g. `5000.50`) to minor units.
pub fn major_to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_amounts_round_to_minor_units() {
        assert_eq!(major_to_minor(5000.0), 500_000);
        assert_eq!(major_to_minor(19.99), 1999);
    }

    #[test]
    fn wire_names_parse() {
        assert_eq!("donation".parse::<PaymentType>().unwrap(), PaymentType::Donation);
        assert_eq!("failed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Failed);
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn successful_subscription_record_defaults() {
        let record = PaymentRecord::successful_subscription(
            UserId::new(),
            "4957102",
            500_000,
            "NGN",
            serde_json::json!({ "plan": "premium" }),
        );
        assert_eq!(record.payment_type, PaymentType::Subscription);
        assert_eq!(record.status, PaymentStatus::Successful);
        assert_eq!(record.transaction_id, "4957102");
    }
}
