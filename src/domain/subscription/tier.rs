//! Subscription tier names.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const FREE: &str = "free";

/// Tier of a subscription: `free` or the lowercase name of a paid plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tier(String);

impl Tier {
    pub fn free() -> Self {
        Self(FREE.to_string())
    }

    /// Normalizes a requested tier name (trimmed, lowercase, non-empty).
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ValidationError::empty_field("tier"));
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if name.len() > 64 || !name.chars().all(allowed) {
            return Err(ValidationError::invalid_format(
                "tier",
                "use letters, digits, '-' or '_'",
            ));
        }
        Ok(Self(name))
    }

    pub fn is_free(&self) -> bool {
        self.0 == FREE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
