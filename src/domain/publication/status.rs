//! Publication status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status of a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    /// Saved by the author, not yet submitted.
    Draft,
    /// Waiting in the moderation queue.
    Pending,
    /// Publicly visible. Frozen for the author.
    Approved,
    Rejected,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Pending => "pending",
            PublicationStatus::Approved => "approved",
            PublicationStatus::Rejected => "rejected",
        }
    }

    /// Whether the author may still edit or delete the publication.
    pub fn is_author_mutable(&self) -> bool {
        !matches!(self, PublicationStatus::Approved)
    }
}

impl StateMachine for PublicationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PublicationStatus::*;
        matches!(
            (self, target),
            // Moderation is accepted from any state, including re-moderation
            (_, Approved)
                | (_, Rejected)
            // Author edit or submit
                | (Draft, Pending)
                | (Pending, Pending)
                | (Rejected, Pending)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PublicationStatus::*;
        match self {
            Draft | Pending | Rejected => vec![Pending, Approved, Rejected],
            Approved => vec![Approved, Rejected],
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PublicationStatus::Draft),
            "pending" => Ok(PublicationStatus::Pending),
            "approved" => Ok(PublicationStatus::Approved),
            "rejected" => Ok(PublicationStatus::Rejected),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown publication status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PublicationStatus::*;

    const ALL: [PublicationStatus; 4] = [Draft, Pending, Approved, Rejected];

    #[test]
    fn moderation_is_accepted_from_every_state() {
        for status in ALL {
            assert!(status.can_transition_to(&Approved));
            assert!(status.can_transition_to(&Rejected));
        }
    }

    #[test]
    fn approved_cannot_return_to_pending() {
        assert!(Approved.transition_to(Pending).is_err());
    }

    #[test]
    fn author_resubmission_targets_pending() {
        for status in [Draft, Pending, Rejected] {
            assert_eq!(status.transition_to(Pending), Ok(Pending));
        }
    }

    #[test]
    fn nothing_transitions_back_to_draft() {
        for status in ALL {
            assert!(!status.can_transition_to(&Draft));
        }
    }

    #[test]
    fn valid_transitions_agree_with_can_transition_to() {
        for status in ALL {
            for target in ALL {
                assert_eq!(
                    status.can_transition_to(&target),
                    status.valid_transitions().contains(&target),
                    "{:?} -> {:?}",
                    status,
                    target
                );
            }
        }
    }

    #[test]
    fn parses_wire_names() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<PublicationStatus>().unwrap(), status);
        }
        assert!("published".parse::<PublicationStatus>().is_err());
    }
}
