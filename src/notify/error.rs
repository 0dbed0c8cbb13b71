//! Error types for notification dispatch.

use thiserror::Error;

use crate::relationship::UserId;
use crate::store::StoreError;

/// Error type for notification operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The target user record does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
