//! Content feed: posts, likes, and comments.
//!
//! Single-document optimistic updates only; the like list is the same
//! toggle-membership pattern as the friends list, scoped to one document.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{FeedError, Result};
pub use manager::FeedManager;
pub use types::{Comment, CommentId, Post, PostId};
