//! User module - accounts, roles and profile sub-documents.

mod account;

pub use account::{normalize_email, AuthorSummary, Professional, Profile, User};
