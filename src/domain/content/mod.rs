//! Community content - news, comments, events and the discussion forum.

mod comment;
mod event;
mod forum;
mod news;

pub use comment::{Comment, MAX_COMMENT_LEN};
pub use event::{Event, EventDetails};
pub use forum::{ForumReply, ForumThread};
pub use news::{News, NewsFields, NewsStatus};
