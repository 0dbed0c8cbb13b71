//! Core types for the content feed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::relationship::UserId;
use crate::store::generate_doc_id;

/// Identifier of a post document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wraps an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_doc_id())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a comment document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Wraps an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_doc_id())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A feed post document.
///
/// The author's display name is denormalized into the post so the feed can
/// render without a user lookup per row. The like list has set semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post id (document key).
    pub id: PostId,
    /// Author's user id.
    pub user_id: UserId,
    /// Author's display name at posting time.
    pub username: String,
    /// Optional text body.
    #[serde(default)]
    pub text_content: Option<String>,
    /// Optional image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Ids of users who liked the post; unique members.
    #[serde(default)]
    pub likes: Vec<UserId>,
    /// When the post was created (Unix timestamp).
    pub created_at: i64,
}

impl Post {
    /// Creates a new post with a generated id and an empty like list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::feed::FeedError::EmptyPost`] if neither text nor an
    /// image URL is provided.
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        text_content: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Self, super::error::FeedError> {
        let text_content = text_content
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        let image_url = image_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(ToString::to_string);
        if text_content.is_none() && image_url.is_none() {
            return Err(super::error::FeedError::EmptyPost);
        }

        Ok(Self {
            id: PostId::generate(),
            user_id,
            username: username.into(),
            text_content,
            image_url,
            likes: Vec::new(),
            created_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Returns whether `user` has liked this post.
    #[must_use]
    pub fn liked_by(&self, user: &UserId) -> bool {
        self.likes.contains(user)
    }

    /// Serializes the post to its JSON document payload.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a post from its JSON document payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A comment document in a post's sub-collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id (document key).
    pub id: CommentId,
    /// Post this comment belongs to.
    pub post_id: PostId,
    /// Author's user id.
    pub user_id: UserId,
    /// Author's display name at commenting time.
    pub username: String,
    /// Comment text.
    pub text_content: String,
    /// When the comment was created (Unix timestamp).
    pub created_at: i64,
}

impl Comment {
    /// Creates a new comment with a generated id.
    #[must_use]
    pub fn new(
        post_id: PostId,
        user_id: UserId,
        username: impl Into<String>,
        text_content: impl Into<String>,
    ) -> Self {
        Self {
            id: CommentId::generate(),
            post_id,
            user_id,
            username: username.into(),
            text_content: text_content.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}
