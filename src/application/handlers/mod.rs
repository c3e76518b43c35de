//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations through the
//! ports. Each area gets its own module; cross-cutting helpers (author
//! population, best-effort notifications) live beside them.

pub mod authors;
pub mod content;
pub mod notification;
pub mod publication;
pub mod subscription;
pub mod user;

pub use authors::AuthorDirectory;
