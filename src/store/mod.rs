//! Relationship store abstraction.
//!
//! The backend document database is consumed through the [`UserStore`] and
//! [`PostStore`] traits rather than an ambient singleton, so the protocol
//! and managers receive the store as an explicit capability. The traits
//! model exactly what the managed backend provides: keyed document reads
//! and creates, atomic read-validate-write transactions over one or two
//! documents, and push-based change notification per document.
//!
//! Atomicity and isolation are the store's responsibility. The transaction
//! methods take a pure validation closure over snapshot state; the store
//! re-runs the closure under its optimistic retry loop when a concurrent
//! writer invalidates the snapshot, and either applies every mutation of the
//! resulting write set or none of them.

mod error;
mod memory;

pub use error::{StoreError, StoreResult, TransactionError};
pub use memory::MemoryStore;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::feed::{Comment, Post, PostId};
use crate::notify::PendingNotification;
use crate::relationship::{PairUpdate, UserId, UserRecord};

/// Number of random bytes in a generated document id.
const DOC_ID_BYTES: usize = 16;

/// Generates a random hex document id, the way the backend assigns ids to
/// added documents.
pub(crate) fn generate_doc_id() -> String {
    let mut bytes = [0u8; DOC_ID_BYTES];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
    hex::encode(bytes)
}

/// User-record collection, keyed by user id.
///
/// Also hosts each user's notification sub-collection, mirroring the
/// backend's `users/{id}/notifications` layout.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Reads a single user record.
    async fn fetch_user(&self, id: &UserId) -> StoreResult<Option<UserRecord>>;

    /// Creates a user record. Create-only: fails if the id is taken.
    async fn insert_user(&self, record: &UserRecord) -> StoreResult<()>;

    /// Runs an atomic read-validate-write over one user record.
    ///
    /// The closure sees the current stored record and returns the record to
    /// write, or an error to abort with no effect.
    async fn transact_user<E, F>(
        &self,
        id: &UserId,
        apply: F,
    ) -> Result<UserRecord, TransactionError<E>>
    where
        F: Fn(&UserRecord) -> Result<UserRecord, E> + Send + Sync + 'static,
        E: Send + 'static;

    /// Runs an atomic read-validate-write spanning two user records.
    ///
    /// The closure sees the current stored records of `actor` and `peer`
    /// (in that order) and returns the pair to write. Either both records
    /// are updated or neither is, with no intermediate state observable to
    /// a concurrent reader. Concurrent transactions on the same pair
    /// serialize via the store's conflict detection.
    async fn transact_pair<E, F>(
        &self,
        actor: &UserId,
        peer: &UserId,
        apply: F,
    ) -> Result<PairUpdate, TransactionError<E>>
    where
        F: Fn(&UserRecord, &UserRecord) -> Result<PairUpdate, E> + Send + Sync + 'static,
        E: Send + 'static;

    /// Case-insensitive display-name prefix search, excluding one id
    /// (normally the searching user).
    async fn search_users(&self, query: &str, exclude: &UserId) -> StoreResult<Vec<UserRecord>>;

    /// Subscribes to changes of one user record.
    ///
    /// The receiver is primed with the current state (`None` if the record
    /// does not exist yet) and observes every committed write.
    async fn watch_user(
        &self,
        id: &UserId,
    ) -> StoreResult<watch::Receiver<Option<UserRecord>>>;

    /// Appends a notification document under the target user.
    async fn push_notification(
        &self,
        target: &UserId,
        notification: &PendingNotification,
    ) -> StoreResult<()>;

    /// Lists the target user's unread notifications, oldest first.
    async fn unread_notifications(
        &self,
        target: &UserId,
    ) -> StoreResult<Vec<PendingNotification>>;

    /// Marks one notification document as read.
    async fn mark_notification_read(
        &self,
        target: &UserId,
        notification_id: &str,
    ) -> StoreResult<()>;
}

/// Post collection keyed by post id, with a comment sub-collection per post.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Creates a post document. Create-only: fails if the id is taken.
    async fn insert_post(&self, post: &Post) -> StoreResult<()>;

    /// Reads a single post.
    async fn fetch_post(&self, id: &PostId) -> StoreResult<Option<Post>>;

    /// Runs an atomic read-validate-write over one post (used for like
    /// toggling).
    async fn transact_post<E, F>(
        &self,
        id: &PostId,
        apply: F,
    ) -> Result<Post, TransactionError<E>>
    where
        F: Fn(&Post) -> Result<Post, E> + Send + Sync + 'static,
        E: Send + 'static;

    /// Appends a comment to the post's sub-collection.
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;

    /// Lists a post's comments, oldest first.
    async fn comments_of(&self, post: &PostId) -> StoreResult<Vec<Comment>>;

    /// Subscribes to the feed: every committed post write publishes the
    /// full post list, newest first.
    async fn watch_feed(&self) -> StoreResult<watch::Receiver<Vec<Post>>>;
}
