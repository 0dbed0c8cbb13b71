//! Error types for user directory operations.

use thiserror::Error;

use crate::relationship::UserId;
use crate::store::StoreError;

/// Error type for directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A record with this id already exists.
    #[error("User already exists: {0}")]
    AlreadyExists(UserId),

    /// The referenced user record does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Invalid data provided.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
