//! Error types for content feed operations.

use thiserror::Error;

use super::types::PostId;
use crate::store::StoreError;

/// Error type for feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A post needs at least text or an image.
    #[error("A post needs text or an image")]
    EmptyPost,

    /// A comment needs non-empty text.
    #[error("A comment needs text")]
    EmptyComment,

    /// The referenced post does not exist.
    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
