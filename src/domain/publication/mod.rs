//! Publication module - member submissions and their moderation workflow.

mod aggregate;
mod author;
mod status;

pub use aggregate::{Publication, PublicationFields, MAX_TITLE_LEN};
pub use author::AuthorRef;
pub use status::PublicationStatus;
