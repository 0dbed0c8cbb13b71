//! High-level API for the friend relationship protocol.
//!
//! [`RelationshipManager`] binds the pure transitions to a store capability.
//! Each of the five operations runs its transition inside the store's
//! two-record transaction, so the whole read-validate-write is atomic:
//! either both records change or neither does. The manager does no locking
//! of its own; serialization of concurrent operations on the same pair is
//! the store's job.

use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::error::{RelationshipError, Result};
use super::transition;
use super::types::{FriendStatus, UserId, UserRecord};
use crate::store::{StoreError, TransactionError, UserStore};

/// Async friend relationship API over a [`UserStore`].
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use amity_core::relationship::RelationshipManager;
/// use amity_core::store::MemoryStore;
///
/// let manager = RelationshipManager::new(Arc::new(MemoryStore::new()));
/// manager.send_request(&alice, &bob).await?;
/// ```
pub struct RelationshipManager<S> {
    store: Arc<S>,
}

impl<S> RelationshipManager<S> {
    /// Creates a manager over the given store capability.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: UserStore> RelationshipManager<S> {
    /// Sends a friend request from `actor` to `peer`.
    ///
    /// Self-requests are rejected before any store access.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, a record is missing, or the
    /// store fails.
    pub async fn send_request(&self, actor: &UserId, peer: &UserId) -> Result<()> {
        if actor == peer {
            return Err(RelationshipError::SelfReference);
        }
        self.store
            .transact_pair(actor, peer, transition::send_request)
            .await
            .map_err(flatten)?;
        debug!(actor = %actor, peer = %peer, "friend request sent");
        Ok(())
    }

    /// Accepts a pending request from `peer` (`actor` is the receiver).
    ///
    /// # Errors
    ///
    /// Returns an error if no pending request exists, a record is missing,
    /// or the store fails.
    pub async fn accept_request(&self, actor: &UserId, peer: &UserId) -> Result<()> {
        self.store
            .transact_pair(actor, peer, transition::accept_request)
            .await
            .map_err(flatten)?;
        debug!(actor = %actor, peer = %peer, "friend request accepted");
        Ok(())
    }

    /// Declines a pending request from `peer` (`actor` is the receiver).
    ///
    /// # Errors
    ///
    /// Returns an error if no pending request exists, a record is missing,
    /// or the store fails.
    pub async fn decline_request(&self, actor: &UserId, peer: &UserId) -> Result<()> {
        self.store
            .transact_pair(actor, peer, transition::decline_request)
            .await
            .map_err(flatten)?;
        debug!(actor = %actor, peer = %peer, "friend request declined");
        Ok(())
    }

    /// Cancels a request the `actor` previously sent to `peer`.
    ///
    /// # Errors
    ///
    /// Returns an error if no pending request exists, a record is missing,
    /// or the store fails.
    pub async fn cancel_request(&self, actor: &UserId, peer: &UserId) -> Result<()> {
        self.store
            .transact_pair(actor, peer, transition::cancel_request)
            .await
            .map_err(flatten)?;
        debug!(actor = %actor, peer = %peer, "friend request cancelled");
        Ok(())
    }

    /// Removes an existing friendship between `actor` and `peer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair is not friends, a record is missing, or
    /// the store fails.
    pub async fn remove_friend(&self, actor: &UserId, peer: &UserId) -> Result<()> {
        self.store
            .transact_pair(actor, peer, transition::remove_friend)
            .await
            .map_err(flatten)?;
        debug!(actor = %actor, peer = %peer, "friend removed");
        Ok(())
    }

    /// Derives the relationship between `actor` and `peer` from the actor's
    /// stored record (one document read).
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's record is missing or the store
    /// fails.
    pub async fn friend_status(&self, actor: &UserId, peer: &UserId) -> Result<FriendStatus> {
        let record = self.fetch_required(actor).await?;
        Ok(record.friend_status(peer))
    }

    /// Resolves the actor's friends list to full records.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's record is missing or the store
    /// fails.
    pub async fn friends_of(&self, actor: &UserId) -> Result<Vec<UserRecord>> {
        let record = self.fetch_required(actor).await?;
        self.resolve(&record.friends).await
    }

    /// Resolves the actor's received-requests list to full records.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's record is missing or the store
    /// fails.
    pub async fn requests_received(&self, actor: &UserId) -> Result<Vec<UserRecord>> {
        let record = self.fetch_required(actor).await?;
        self.resolve(&record.friend_requests_received).await
    }

    /// Resolves the actor's sent-requests list to full records.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's record is missing or the store
    /// fails.
    pub async fn requests_sent(&self, actor: &UserId) -> Result<Vec<UserRecord>> {
        let record = self.fetch_required(actor).await?;
        self.resolve(&record.friend_requests_sent).await
    }

    /// Subscribes to changes of one user record, for push-based list
    /// refresh in the presentation layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn watch_user(
        &self,
        id: &UserId,
    ) -> Result<watch::Receiver<Option<UserRecord>>> {
        Ok(self.store.watch_user(id).await?)
    }

    async fn fetch_required(&self, id: &UserId) -> Result<UserRecord> {
        self.store
            .fetch_user(id)
            .await?
            .ok_or_else(|| RelationshipError::UserNotFound(id.clone()))
    }

    /// Resolves a list of ids to records, skipping dangling references.
    async fn resolve(&self, ids: &[UserId]) -> Result<Vec<UserRecord>> {
        let fetched =
            try_join_all(ids.iter().map(|id| self.store.fetch_user(id))).await?;
        let mut records = Vec::with_capacity(fetched.len());
        for (id, record) in ids.iter().zip(fetched) {
            match record {
                Some(record) => records.push(record),
                None => warn!(user = %id, "referenced user record missing, skipping"),
            }
        }
        Ok(records)
    }
}

/// Collapses a transaction outcome into the protocol error type.
fn flatten(err: TransactionError<RelationshipError>) -> RelationshipError {
    match err {
        TransactionError::Aborted(e) => e,
        TransactionError::Store(StoreError::NotFound(path)) => {
            // The pair transaction names missing records by document path.
            let id = path.rsplit('/').next().unwrap_or(&path);
            RelationshipError::UserNotFound(UserId::new(id))
        }
        TransactionError::Store(e) => RelationshipError::Store(e),
    }
}
