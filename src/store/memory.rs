//! In-memory store implementation.
//!
//! [`MemoryStore`] is the in-process reference implementation of the store
//! traits, used by the test suites and by callers that want the full
//! protocol semantics without a backend. Documents carry a version number;
//! transactions read a snapshot, run the validation closure outside the
//! lock, then commit only if no concurrent writer bumped a version in the
//! meantime, retrying up to a bounded budget. This mirrors the
//! read-validate-write semantics of the managed backend's transaction API.

use std::collections::HashMap;

use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::error::{StoreError, StoreResult, TransactionError};
use super::{PostStore, UserStore};
use crate::feed::{Comment, Post, PostId};
use crate::notify::PendingNotification;
use crate::relationship::{PairUpdate, UserId, UserRecord};

/// Retry budget for optimistic transactions.
const MAX_TRANSACTION_RETRIES: u32 = 8;

#[derive(Debug, Clone)]
struct Versioned<T> {
    doc: T,
    version: u64,
}

#[derive(Default)]
struct UserTable {
    docs: HashMap<UserId, Versioned<UserRecord>>,
    watchers: HashMap<UserId, watch::Sender<Option<UserRecord>>>,
    notifications: HashMap<UserId, Vec<PendingNotification>>,
}

impl UserTable {
    /// Publishes the current state of one record to its watcher, if any.
    fn notify(&self, id: &UserId) {
        if let Some(tx) = self.watchers.get(id) {
            tx.send_replace(self.docs.get(id).map(|v| v.doc.clone()));
        }
    }
}

struct PostTable {
    docs: HashMap<PostId, Versioned<Post>>,
    comments: HashMap<PostId, Vec<Comment>>,
    feed: watch::Sender<Vec<Post>>,
}

impl Default for PostTable {
    fn default() -> Self {
        let (feed, _) = watch::channel(Vec::new());
        Self {
            docs: HashMap::new(),
            comments: HashMap::new(),
            feed,
        }
    }
}

impl PostTable {
    /// Publishes the full feed, newest first, to all subscribers.
    fn publish_feed(&self) {
        let mut posts: Vec<Post> = self.docs.values().map(|v| v.doc.clone()).collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        self.feed.send_replace(posts);
    }
}

/// In-process document store with versioned transactions and per-document
/// change subscriptions.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<UserTable>,
    posts: RwLock<PostTable>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn fetch_user(&self, id: &UserId) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.docs.get(id).map(|v| v.doc.clone()))
    }

    async fn insert_user(&self, record: &UserRecord) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.docs.contains_key(&record.uid) {
            return Err(StoreError::AlreadyExists(format!("users/{}", record.uid)));
        }
        users.docs.insert(
            record.uid.clone(),
            Versioned {
                doc: record.clone(),
                version: 1,
            },
        );
        users.notify(&record.uid);
        Ok(())
    }

    async fn transact_user<E, F>(
        &self,
        id: &UserId,
        apply: F,
    ) -> Result<UserRecord, TransactionError<E>>
    where
        F: Fn(&UserRecord) -> Result<UserRecord, E> + Send + Sync + 'static,
        E: Send + 'static,
    {
        for attempt in 0..MAX_TRANSACTION_RETRIES {
            let snapshot = {
                let users = self.users.read().await;
                users
                    .docs
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(format!("users/{id}")))?
            };

            let updated = apply(&snapshot.doc).map_err(TransactionError::Aborted)?;

            let mut users = self.users.write().await;
            let current_version = users.docs.get(id).map(|v| v.version);
            if current_version != Some(snapshot.version) {
                debug!(user = %id, attempt, "transaction snapshot stale, retrying");
                continue;
            }
            users.docs.insert(
                id.clone(),
                Versioned {
                    doc: updated.clone(),
                    version: snapshot.version + 1,
                },
            );
            users.notify(id);
            return Ok(updated);
        }
        Err(TransactionError::Store(StoreError::Conflict(format!(
            "users/{id}"
        ))))
    }

    async fn transact_pair<E, F>(
        &self,
        actor: &UserId,
        peer: &UserId,
        apply: F,
    ) -> Result<PairUpdate, TransactionError<E>>
    where
        F: Fn(&UserRecord, &UserRecord) -> Result<PairUpdate, E> + Send + Sync + 'static,
        E: Send + 'static,
    {
        for attempt in 0..MAX_TRANSACTION_RETRIES {
            let (actor_snap, peer_snap) = {
                let users = self.users.read().await;
                let actor_snap = users
                    .docs
                    .get(actor)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(format!("users/{actor}")))?;
                let peer_snap = users
                    .docs
                    .get(peer)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(format!("users/{peer}")))?;
                (actor_snap, peer_snap)
            };

            let update = apply(&actor_snap.doc, &peer_snap.doc).map_err(TransactionError::Aborted)?;

            let mut users = self.users.write().await;
            let actor_version = users.docs.get(actor).map(|v| v.version);
            let peer_version = users.docs.get(peer).map(|v| v.version);
            if actor_version != Some(actor_snap.version) || peer_version != Some(peer_snap.version)
            {
                debug!(
                    actor = %actor,
                    peer = %peer,
                    attempt,
                    "pair transaction snapshot stale, retrying"
                );
                continue;
            }

            // Commit both writes under the exclusive lock so no reader can
            // observe one side updated without the other.
            users.docs.insert(
                actor.clone(),
                Versioned {
                    doc: update.actor.clone(),
                    version: actor_snap.version + 1,
                },
            );
            users.docs.insert(
                peer.clone(),
                Versioned {
                    doc: update.peer.clone(),
                    version: peer_snap.version + 1,
                },
            );
            users.notify(actor);
            users.notify(peer);
            return Ok(update);
        }
        Err(TransactionError::Store(StoreError::Conflict(format!(
            "users/{actor},users/{peer}"
        ))))
    }

    async fn search_users(&self, query: &str, exclude: &UserId) -> StoreResult<Vec<UserRecord>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.users.read().await;
        let mut matches: Vec<UserRecord> = users
            .docs
            .values()
            .filter(|v| v.doc.uid != *exclude)
            .filter(|v| v.doc.display_name.to_lowercase().starts_with(&query))
            .map(|v| v.doc.clone())
            .collect();
        matches.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(matches)
    }

    async fn watch_user(&self, id: &UserId) -> StoreResult<watch::Receiver<Option<UserRecord>>> {
        let mut users = self.users.write().await;
        let current = users.docs.get(id).map(|v| v.doc.clone());
        let tx = users
            .watchers
            .entry(id.clone())
            .or_insert_with(|| watch::channel(current).0);
        Ok(tx.subscribe())
    }

    async fn push_notification(
        &self,
        target: &UserId,
        notification: &PendingNotification,
    ) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if !users.docs.contains_key(target) {
            return Err(StoreError::NotFound(format!("users/{target}")));
        }
        users
            .notifications
            .entry(target.clone())
            .or_default()
            .push(notification.clone());
        Ok(())
    }

    async fn unread_notifications(
        &self,
        target: &UserId,
    ) -> StoreResult<Vec<PendingNotification>> {
        let users = self.users.read().await;
        if !users.docs.contains_key(target) {
            return Err(StoreError::NotFound(format!("users/{target}")));
        }
        Ok(users
            .notifications
            .get(target)
            .map(|notes| notes.iter().filter(|n| !n.read).cloned().collect())
            .unwrap_or_default())
    }

    async fn mark_notification_read(
        &self,
        target: &UserId,
        notification_id: &str,
    ) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let notes = users.notifications.get_mut(target).ok_or_else(|| {
            StoreError::NotFound(format!("users/{target}/notifications/{notification_id}"))
        })?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("users/{target}/notifications/{notification_id}"))
            })?;
        note.read = true;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        let mut posts = self.posts.write().await;
        if posts.docs.contains_key(&post.id) {
            return Err(StoreError::AlreadyExists(format!("posts/{}", post.id)));
        }
        posts.docs.insert(
            post.id.clone(),
            Versioned {
                doc: post.clone(),
                version: 1,
            },
        );
        posts.publish_feed();
        Ok(())
    }

    async fn fetch_post(&self, id: &PostId) -> StoreResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.docs.get(id).map(|v| v.doc.clone()))
    }

    async fn transact_post<E, F>(&self, id: &PostId, apply: F) -> Result<Post, TransactionError<E>>
    where
        F: Fn(&Post) -> Result<Post, E> + Send + Sync + 'static,
        E: Send + 'static,
    {
        for attempt in 0..MAX_TRANSACTION_RETRIES {
            let snapshot = {
                let posts = self.posts.read().await;
                posts
                    .docs
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(format!("posts/{id}")))?
            };

            let updated = apply(&snapshot.doc).map_err(TransactionError::Aborted)?;

            let mut posts = self.posts.write().await;
            let current_version = posts.docs.get(id).map(|v| v.version);
            if current_version != Some(snapshot.version) {
                debug!(post = %id, attempt, "post transaction snapshot stale, retrying");
                continue;
            }
            posts.docs.insert(
                id.clone(),
                Versioned {
                    doc: updated.clone(),
                    version: snapshot.version + 1,
                },
            );
            posts.publish_feed();
            return Ok(updated);
        }
        Err(TransactionError::Store(StoreError::Conflict(format!(
            "posts/{id}"
        ))))
    }

    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        let mut posts = self.posts.write().await;
        if !posts.docs.contains_key(&comment.post_id) {
            return Err(StoreError::NotFound(format!("posts/{}", comment.post_id)));
        }
        posts
            .comments
            .entry(comment.post_id.clone())
            .or_default()
            .push(comment.clone());
        Ok(())
    }

    async fn comments_of(&self, post: &PostId) -> StoreResult<Vec<Comment>> {
        let posts = self.posts.read().await;
        if !posts.docs.contains_key(post) {
            return Err(StoreError::NotFound(format!("posts/{post}")));
        }
        Ok(posts.comments.get(post).cloned().unwrap_or_default())
    }

    async fn watch_feed(&self) -> StoreResult<watch::Receiver<Vec<Post>>> {
        let posts = self.posts.read().await;
        Ok(posts.feed.subscribe())
    }
}
