//! Error types for friend relationship operations.

use thiserror::Error;

use super::types::UserId;
use crate::store::StoreError;

/// Error type for relationship protocol operations.
///
/// Validation failures leave stored state exactly as it was; the protocol
/// never retries on its own.
#[derive(Debug, Error)]
pub enum RelationshipError {
    /// A user tried to friend themselves.
    #[error("Cannot send a friend request to yourself")]
    SelfReference,

    /// The pair is already in the friends state.
    #[error("Already friends with {0}")]
    AlreadyFriends(UserId),

    /// A request between the pair is already outstanding (in either
    /// direction).
    #[error("Friend request already sent or received for {0}")]
    RequestAlreadyPending(UserId),

    /// No pending request exists for the pair.
    #[error("Friend request not found for {0}")]
    NoPendingRequest(UserId),

    /// The pair is not in the friends state.
    #[error("User {0} is not your friend")]
    NotFriends(UserId),

    /// A referenced user record does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The relationship store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for relationship operations.
pub type Result<T> = std::result::Result<T, RelationshipError>;
