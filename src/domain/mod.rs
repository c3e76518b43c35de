//! Domain layer - aggregates, value objects and business rules.
//!
//! Nothing in here performs I/O. Persistence and outbound calls go through
//! the traits in `crate::ports`.

pub mod content;
pub mod foundation;
pub mod notification;
pub mod publication;
pub mod subscription;
pub mod user;
