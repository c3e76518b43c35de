//! Community content handlers: news, comments, events and the forum.

mod comments;
mod events;
mod forum;
mod news;

pub use comments::{CommentView, CommentsHandler};
pub use events::EventsHandler;
pub use forum::{ForumHandler, ReplyView, ThreadDetail, ThreadView};
pub use news::{NewsCommand, NewsHandler};
