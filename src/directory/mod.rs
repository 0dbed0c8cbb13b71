//! User directory: record lifecycle and profile updates.
//!
//! Records are created once at signup with empty relationship lists and are
//! never hard-deleted. Profile fields (display name, image, push token)
//! change through single-document transactions; the relationship lists are
//! only ever touched by the protocol in [`crate::relationship`].

pub mod error;

pub use error::{DirectoryError, Result};

use std::convert::Infallible;
use std::sync::Arc;

use tracing::info;

use crate::relationship::{UserId, UserRecord};
use crate::store::{StoreError, TransactionError, UserStore};

/// Async directory API over a [`UserStore`].
pub struct UserDirectory<S> {
    store: Arc<S>,
}

impl<S> UserDirectory<S> {
    /// Creates a directory over the given store capability.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: UserStore> UserDirectory<S> {
    /// Creates a user record at signup, all relationship lists empty.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidData`] for an empty id or display
    /// name, [`DirectoryError::AlreadyExists`] if the id is taken, or an
    /// error if the store fails.
    pub async fn create_user(
        &self,
        id: UserId,
        display_name: &str,
        email: &str,
    ) -> Result<UserRecord> {
        if id.is_empty() {
            return Err(DirectoryError::InvalidData("user id is empty".to_string()));
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(DirectoryError::InvalidData(
                "display name is empty".to_string(),
            ));
        }

        let record = UserRecord::new(id, display_name, email);
        self.store
            .insert_user(&record)
            .await
            .map_err(|err| match err {
                StoreError::AlreadyExists(_) => DirectoryError::AlreadyExists(record.uid.clone()),
                other => DirectoryError::Store(other),
            })?;
        info!(user = %record.uid, "user record created");
        Ok(record)
    }

    /// Reads a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or the store fails.
    pub async fn get_user(&self, id: &UserId) -> Result<UserRecord> {
        self.store
            .fetch_user(id)
            .await?
            .ok_or_else(|| DirectoryError::UserNotFound(id.clone()))
    }

    /// Searches users by display-name prefix, excluding the viewer.
    ///
    /// An empty query returns no results.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn search(&self, query: &str, viewer: &UserId) -> Result<Vec<UserRecord>> {
        Ok(self.store.search_users(query, viewer).await?)
    }

    /// Registers or clears the user's push notification token.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or the store fails.
    pub async fn set_push_token(&self, id: &UserId, token: Option<&str>) -> Result<UserRecord> {
        let token = token.map(ToString::to_string);
        self.update(id, move |record| {
            let mut next = record.clone();
            next.push_token = token.clone();
            next
        })
        .await
    }

    /// Sets or clears the user's profile image URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or the store fails.
    pub async fn set_profile_image(&self, id: &UserId, url: Option<&str>) -> Result<UserRecord> {
        let url = url.map(ToString::to_string);
        self.update(id, move |record| {
            let mut next = record.clone();
            next.profile_image = url.clone();
            next
        })
        .await
    }

    /// Changes the user's display name.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidData`] for a blank name, or an
    /// error if the record is missing or the store fails.
    pub async fn set_display_name(&self, id: &UserId, display_name: &str) -> Result<UserRecord> {
        let display_name = display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(DirectoryError::InvalidData(
                "display name is empty".to_string(),
            ));
        }
        self.update(id, move |record| {
            let mut next = record.clone();
            next.display_name = display_name.clone();
            next
        })
        .await
    }

    /// Runs an infallible profile update as a single-document transaction.
    async fn update<F>(&self, id: &UserId, apply: F) -> Result<UserRecord>
    where
        F: Fn(&UserRecord) -> UserRecord + Send + Sync + 'static,
    {
        self.store
            .transact_user::<Infallible, _>(id, move |record| Ok(apply(record)))
            .await
            .map_err(|err| match err {
                TransactionError::Aborted(never) => match never {},
                TransactionError::Store(StoreError::NotFound(_)) => {
                    DirectoryError::UserNotFound(id.clone())
                }
                TransactionError::Store(e) => DirectoryError::Store(e),
            })
    }
}
