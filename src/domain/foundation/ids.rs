//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a registered user.
    UserId
);
uuid_id!(
    /// Identifier of a publication.
    PublicationId
);
uuid_id!(
    /// Identifier of a subscription record.
    SubscriptionId
);
uuid_id!(
    /// Identifier of a subscription plan.
    PlanId
);
uuid_id!(
    /// Identifier of a payment history entry.
    PaymentId
);
uuid_id!(
    /// Identifier of an in-app notification.
    NotificationId
);
uuid_id!(
    /// Identifier of a bulk communication record.
    CommunicationId
);
uuid_id!(NewsId);
uuid_id!(CommentId);
uuid_id!(
    /// Identifier of an association event (meeting, conference, workshop).
    EventId
);
uuid_id!(ThreadId);
uuid_id!(ReplyId);
