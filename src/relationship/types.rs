//! Core types for the friend relationship protocol.
//!
//! A [`UserRecord`] is the per-user document held in the relationship store.
//! Besides profile fields it carries the three relationship lists that the
//! protocol transitions operate on. The lists have set semantics: a peer id
//! appears at most once, and a user never appears in its own lists.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a user, issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a backend-issued id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the id is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Relationship between the viewing user and a peer, derived from the
/// viewer's own record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendStatus {
    /// Confirmed, symmetric friendship.
    Friends,
    /// The viewer has an outstanding request to the peer.
    RequestSent,
    /// The peer has an outstanding request to the viewer.
    RequestReceived,
    /// No relationship.
    NotFriends,
}

impl FriendStatus {
    /// Converts to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Friends => "friends",
            Self::RequestSent => "request_sent",
            Self::RequestReceived => "request_received",
            Self::NotFriends => "not_friends",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "friends" => Some(Self::Friends),
            "request_sent" => Some(Self::RequestSent),
            "request_received" => Some(Self::RequestReceived),
            "not_friends" => Some(Self::NotFriends),
            _ => None,
        }
    }
}

/// Per-user document in the relationship store.
///
/// Field names serialize in camelCase to match the backend's document
/// schema (`friendRequestsSent`, `pushToken`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Stable user id (document key).
    pub uid: UserId,
    /// User-facing display name.
    pub display_name: String,
    /// Account email address.
    pub email: String,
    /// Optional profile image URL.
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Optional push notification token for this user's device.
    #[serde(default)]
    pub push_token: Option<String>,
    /// Ids this user has asked to friend.
    #[serde(default)]
    pub friend_requests_sent: Vec<UserId>,
    /// Ids who have asked this user to be friends.
    #[serde(default)]
    pub friend_requests_received: Vec<UserId>,
    /// Ids with a confirmed, symmetric friendship.
    #[serde(default)]
    pub friends: Vec<UserId>,
}

impl UserRecord {
    /// Creates a fresh record at signup, with all relationship lists empty.
    #[must_use]
    pub fn new(uid: UserId, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid,
            display_name: display_name.into(),
            email: email.into(),
            profile_image: None,
            push_token: None,
            friend_requests_sent: Vec::new(),
            friend_requests_received: Vec::new(),
            friends: Vec::new(),
        }
    }

    /// Returns whether `peer` is a confirmed friend.
    #[must_use]
    pub fn has_friend(&self, peer: &UserId) -> bool {
        self.friends.contains(peer)
    }

    /// Returns whether this user has an outstanding request to `peer`.
    #[must_use]
    pub fn has_sent_request(&self, peer: &UserId) -> bool {
        self.friend_requests_sent.contains(peer)
    }

    /// Returns whether `peer` has an outstanding request to this user.
    #[must_use]
    pub fn has_received_request(&self, peer: &UserId) -> bool {
        self.friend_requests_received.contains(peer)
    }

    /// Derives the relationship with `peer` from this record alone.
    ///
    /// Membership is checked in priority order: friends, then sent
    /// requests, then received requests.
    #[must_use]
    pub fn friend_status(&self, peer: &UserId) -> FriendStatus {
        if self.has_friend(peer) {
            FriendStatus::Friends
        } else if self.has_sent_request(peer) {
            FriendStatus::RequestSent
        } else if self.has_received_request(peer) {
            FriendStatus::RequestReceived
        } else {
            FriendStatus::NotFriends
        }
    }

    /// Serializes the record to its JSON document payload.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a record from its JSON document payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The new record pair produced by a successful protocol transition.
///
/// Both records are written back atomically, or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairUpdate {
    /// Updated record of the user who invoked the operation.
    pub actor: UserRecord,
    /// Updated record of the peer.
    pub peer: UserRecord,
}

/// Adds `id` to `list` unless already present (set semantics).
pub(crate) fn insert_unique(list: &mut Vec<UserId>, id: &UserId) {
    if !list.contains(id) {
        list.push(id.clone());
    }
}

/// Removes `id` from `list` if present.
pub(crate) fn remove_id(list: &mut Vec<UserId>, id: &UserId) {
    list.retain(|entry| entry != id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_display_and_as_str() {
        let id = UserId::new("user-1");
        assert_eq!(id.as_str(), "user-1");
        assert_eq!(id.to_string(), "user-1");
        assert!(!id.is_empty());
        assert!(UserId::new("").is_empty());
    }

    #[test]
    fn friend_status_as_str() {
        assert_eq!(FriendStatus::Friends.as_str(), "friends");
        assert_eq!(FriendStatus::RequestSent.as_str(), "request_sent");
        assert_eq!(FriendStatus::RequestReceived.as_str(), "request_received");
        assert_eq!(FriendStatus::NotFriends.as_str(), "not_friends");
    }

    #[test]
    fn friend_status_parse() {
        assert_eq!(FriendStatus::parse("friends"), Some(FriendStatus::Friends));
        assert_eq!(
            FriendStatus::parse("request_sent"),
            Some(FriendStatus::RequestSent)
        );
        assert_eq!(
            FriendStatus::parse("request_received"),
            Some(FriendStatus::RequestReceived)
        );
        assert_eq!(
            FriendStatus::parse("not_friends"),
            Some(FriendStatus::NotFriends)
        );
        assert_eq!(FriendStatus::parse("invalid"), None);
    }

    #[test]
    fn new_record_has_empty_lists() {
        let record = UserRecord::new(UserId::new("u1"), "Alice", "alice@example.com");
        assert!(record.friend_requests_sent.is_empty());
        assert!(record.friend_requests_received.is_empty());
        assert!(record.friends.is_empty());
        assert!(record.profile_image.is_none());
        assert!(record.push_token.is_none());
    }

    #[test]
    fn friend_status_priority_order() {
        let peer = UserId::new("u2");
        let mut record = UserRecord::new(UserId::new("u1"), "Alice", "alice@example.com");
        assert_eq!(record.friend_status(&peer), FriendStatus::NotFriends);

        record.friend_requests_received.push(peer.clone());
        assert_eq!(record.friend_status(&peer), FriendStatus::RequestReceived);

        record.friend_requests_sent.push(peer.clone());
        assert_eq!(record.friend_status(&peer), FriendStatus::RequestSent);

        record.friends.push(peer.clone());
        assert_eq!(record.friend_status(&peer), FriendStatus::Friends);
    }

    #[test]
    fn json_roundtrip_preserves_lists() {
        let mut record = UserRecord::new(UserId::new("u1"), "Alice", "alice@example.com");
        record.friends.push(UserId::new("u2"));
        record.friend_requests_sent.push(UserId::new("u3"));

        let json = record.to_json().unwrap();
        let recovered = UserRecord::from_json(&json).unwrap();
        assert_eq!(recovered, record);
    }

    #[test]
    fn json_uses_backend_field_names() {
        let record = UserRecord::new(UserId::new("u1"), "Alice", "alice@example.com");
        let json = record.to_json().unwrap();

        assert!(json.contains("displayName"));
        assert!(json.contains("friendRequestsSent"));
        assert!(json.contains("friendRequestsReceived"));
        assert!(json.contains("pushToken"));
        assert!(!json.contains("display_name"));
    }

    #[test]
    fn from_json_defaults_missing_lists() {
        let json = r#"{"uid":"u1","displayName":"Alice","email":"a@example.com"}"#;
        let record = UserRecord::from_json(json).unwrap();
        assert!(record.friends.is_empty());
        assert!(record.friend_requests_sent.is_empty());
        assert!(record.friend_requests_received.is_empty());
    }

    #[test]
    fn insert_unique_rejects_duplicates() {
        let mut list = Vec::new();
        let id = UserId::new("u2");
        insert_unique(&mut list, &id);
        insert_unique(&mut list, &id);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_id_is_noop_when_absent() {
        let mut list = vec![UserId::new("u2")];
        remove_id(&mut list, &UserId::new("u3"));
        assert_eq!(list.len(), 1);
        remove_id(&mut list, &UserId::new("u2"));
        assert!(list.is_empty());
    }
}
