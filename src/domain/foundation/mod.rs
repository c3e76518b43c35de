//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, roles, pagination and the error vocabulary used by
//! every other domain module.

mod auth;
mod errors;
mod ids;
mod ownership;
mod pagination;
mod role;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{required_text, DomainError, ErrorCode, ValidationError};
pub use ids::{
    CommentId, CommunicationId, EventId, NewsId, NotificationId, PaymentId, PlanId,
    PublicationId, ReplyId, SubscriptionId, ThreadId, UserId,
};
pub use ownership::OwnedByUser;
pub use pagination::{Page, Paginated, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use role::Role;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
