//! Notification dispatch.
//!
//! Best-effort by design: a failure to notify never fails the operation
//! that triggered it. When the target user has a registered push token the
//! dispatcher hands the token back for the platform push channel to
//! deliver; otherwise it queues a pending notification document under the
//! target user, which the app drains once at startup.

pub mod error;

pub use error::{NotifyError, Result};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::relationship::UserId;
use crate::store::{generate_doc_id, UserStore};

/// Kind of a queued notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone sent the target user a friend request.
    FriendRequest,
}

impl NotificationKind {
    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FriendRequest => "friend_request",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "friend_request" => Some(Self::FriendRequest),
            _ => None,
        }
    }
}

/// A notification document queued under a user for later display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingNotification {
    /// Notification id (document key).
    pub id: String,
    /// What the notification is about.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display name of the user who triggered it.
    pub sender_name: String,
    /// When the notification was queued (Unix timestamp).
    pub created_at: i64,
    /// Whether the target user has seen it.
    #[serde(rename = "isRead", default)]
    pub read: bool,
}

impl PendingNotification {
    /// Creates an unread friend-request notification.
    #[must_use]
    pub fn friend_request(sender_name: impl Into<String>) -> Self {
        Self {
            id: generate_doc_id(),
            kind: NotificationKind::FriendRequest,
            sender_name: sender_name.into(),
            created_at: chrono::Utc::now().timestamp(),
            read: false,
        }
    }
}

/// How a notification was handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The target has a registered device; the platform layer should push
    /// to this token.
    Push {
        /// The target's push token.
        token: String,
    },
    /// No token registered; queued for the target's next session.
    Queued,
}

/// Async notification dispatch over a [`UserStore`].
pub struct NotificationDispatcher<S> {
    store: Arc<S>,
}

impl<S> NotificationDispatcher<S> {
    /// Creates a dispatcher over the given store capability.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: UserStore> NotificationDispatcher<S> {
    /// Notifies `target` of a friend request from `sender_name`.
    ///
    /// Returns the push token if the target has one registered; otherwise
    /// queues a pending notification document and returns
    /// [`Delivery::Queued`].
    ///
    /// # Errors
    ///
    /// Returns an error if the target record is missing or the store
    /// fails.
    pub async fn notify_friend_request(
        &self,
        target: &UserId,
        sender_name: &str,
    ) -> Result<Delivery> {
        let record = self
            .store
            .fetch_user(target)
            .await?
            .ok_or_else(|| NotifyError::UserNotFound(target.clone()))?;

        if let Some(token) = record.push_token {
            debug!(target = %target, "friend request notification handed to push channel");
            return Ok(Delivery::Push { token });
        }

        let note = PendingNotification::friend_request(sender_name);
        self.store.push_notification(target, &note).await?;
        debug!(target = %target, "friend request notification queued");
        Ok(Delivery::Queued)
    }

    /// Drains the target's unread notifications, marking each as read.
    ///
    /// Called once per session at startup, after which change
    /// subscriptions keep the UI current.
    ///
    /// # Errors
    ///
    /// Returns an error if the target record is missing or the store
    /// fails.
    pub async fn take_unread(&self, target: &UserId) -> Result<Vec<PendingNotification>> {
        let unread = self
            .store
            .unread_notifications(target)
            .await
            .map_err(|err| match err {
                crate::store::StoreError::NotFound(_) => {
                    NotifyError::UserNotFound(target.clone())
                }
                other => NotifyError::Store(other),
            })?;
        for note in &unread {
            self.store.mark_notification_read(target, &note.id).await?;
        }
        Ok(unread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::UserRecord;
    use crate::store::MemoryStore;

    fn dispatcher() -> NotificationDispatcher<MemoryStore> {
        NotificationDispatcher::new(Arc::new(MemoryStore::new()))
    }

    async fn seed(
        dispatcher: &NotificationDispatcher<MemoryStore>,
        id: &str,
        token: Option<&str>,
    ) -> UserId {
        let mut record = UserRecord::new(UserId::new(id), "User", format!("{id}@example.com"));
        record.push_token = token.map(ToString::to_string);
        dispatcher.store.insert_user(&record).await.unwrap();
        record.uid
    }

    #[test]
    fn kind_string_mapping() {
        assert_eq!(NotificationKind::FriendRequest.as_str(), "friend_request");
        assert_eq!(
            NotificationKind::parse("friend_request"),
            Some(NotificationKind::FriendRequest)
        );
        assert_eq!(NotificationKind::parse("invalid"), None);
    }

    #[test]
    fn notification_json_uses_backend_field_names() {
        let note = PendingNotification::friend_request("Alice");
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"type\":\"friend_request\""));
        assert!(json.contains("senderName"));
        assert!(json.contains("isRead"));
    }

    #[tokio::test]
    async fn push_token_takes_priority() {
        let dispatcher = dispatcher();
        let target = seed(&dispatcher, "u1", Some("token-1")).await;

        let delivery = dispatcher
            .notify_friend_request(&target, "Alice")
            .await
            .unwrap();
        assert_eq!(
            delivery,
            Delivery::Push {
                token: "token-1".to_string()
            }
        );

        // Nothing queued when pushed.
        assert!(dispatcher.take_unread(&target).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn queues_when_no_token() {
        let dispatcher = dispatcher();
        let target = seed(&dispatcher, "u1", None).await;

        let delivery = dispatcher
            .notify_friend_request(&target, "Alice")
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Queued);

        let unread = dispatcher.take_unread(&target).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].sender_name, "Alice");
        assert_eq!(unread[0].kind, NotificationKind::FriendRequest);

        // Drained notifications stay read.
        assert!(dispatcher.take_unread(&target).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_target_fails() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .notify_friend_request(&UserId::new("ghost"), "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::UserNotFound(_)));
    }
}
