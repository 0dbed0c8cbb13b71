//! Error types for relationship store operations.

use thiserror::Error;

/// Errors surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A create-only write hit an existing document.
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    /// The optimistic retry budget was exhausted by concurrent writers.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// Connectivity or backend failure, opaque cause.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Document payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of an atomic read-validate-write.
///
/// Distinguishes the transaction aborting on the caller's own validation
/// (`Aborted`, no effects applied) from the store itself failing.
#[derive(Debug, Error)]
pub enum TransactionError<E> {
    /// The validation closure rejected the current state; nothing was
    /// written.
    #[error("Transaction aborted: {0}")]
    Aborted(E),

    /// The store failed before or during the commit.
    #[error(transparent)]
    Store(#[from] StoreError),
}
