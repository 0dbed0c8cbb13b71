//! High-level API for the content feed.
//!
//! Posts and comments are plain create/read operations; the only stateful
//! update is like toggling, which runs as a single-document transaction so
//! the like list keeps unique members under concurrent taps from multiple
//! devices.

use std::convert::Infallible;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::error::{FeedError, Result};
use super::types::{Comment, Post, PostId};
use crate::relationship::UserId;
use crate::store::{PostStore, StoreError, TransactionError};

/// Async feed API over a [`PostStore`].
pub struct FeedManager<S> {
    store: Arc<S>,
}

impl<S> FeedManager<S> {
    /// Creates a manager over the given store capability.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: PostStore> FeedManager<S> {
    /// Creates a new post.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EmptyPost`] if neither text nor an image URL is
    /// provided, or an error if the store fails.
    pub async fn create_post(
        &self,
        author: &UserId,
        author_name: &str,
        text_content: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Post> {
        let post = Post::new(author.clone(), author_name, text_content, image_url)?;
        self.store.insert_post(&post).await?;
        debug!(post = %post.id, author = %author, "post created");
        Ok(post)
    }

    /// Toggles `user`'s like on a post: adds the id if absent, removes it
    /// if present. Runs as a single-document transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the post is missing or the store fails.
    pub async fn toggle_like(&self, post: &PostId, user: &UserId) -> Result<Post> {
        let user = user.clone();
        let updated = self
            .store
            .transact_post::<Infallible, _>(post, move |current| {
                let mut next = current.clone();
                if next.liked_by(&user) {
                    next.likes.retain(|id| id != &user);
                } else {
                    next.likes.push(user.clone());
                }
                Ok(next)
            })
            .await
            .map_err(|err| flatten(err, post))?;
        Ok(updated)
    }

    /// Adds a comment to a post.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EmptyComment`] for blank text, or an error if
    /// the post is missing or the store fails.
    pub async fn add_comment(
        &self,
        post: &PostId,
        author: &UserId,
        author_name: &str,
        text: &str,
    ) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FeedError::EmptyComment);
        }

        let comment = Comment::new(post.clone(), author.clone(), author_name, text);
        self.store
            .insert_comment(&comment)
            .await
            .map_err(|err| match err {
                StoreError::NotFound(_) => FeedError::PostNotFound(post.clone()),
                other => FeedError::Store(other),
            })?;
        debug!(post = %post, author = %author, "comment added");
        Ok(comment)
    }

    /// Reads a single post.
    ///
    /// # Errors
    ///
    /// Returns an error if the post is missing or the store fails.
    pub async fn get_post(&self, id: &PostId) -> Result<Post> {
        self.store
            .fetch_post(id)
            .await?
            .ok_or_else(|| FeedError::PostNotFound(id.clone()))
    }

    /// Lists a post's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the post is missing or the store fails.
    pub async fn comments(&self, post: &PostId) -> Result<Vec<Comment>> {
        self.store
            .comments_of(post)
            .await
            .map_err(|err| match err {
                StoreError::NotFound(_) => FeedError::PostNotFound(post.clone()),
                other => FeedError::Store(other),
            })
    }

    /// Subscribes to the feed, newest post first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn watch_feed(&self) -> Result<watch::Receiver<Vec<Post>>> {
        Ok(self.store.watch_feed().await?)
    }
}

fn flatten(err: TransactionError<Infallible>, post: &PostId) -> FeedError {
    match err {
        TransactionError::Aborted(never) => match never {},
        TransactionError::Store(StoreError::NotFound(_)) => FeedError::PostNotFound(post.clone()),
        TransactionError::Store(e) => FeedError::Store(e),
    }
}
