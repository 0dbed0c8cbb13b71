//! Reusable test helpers for integration tests.
//!
//! All suites run against a shared in-process [`MemoryStore`], which
//! provides the same transactional semantics the managed backend does.
//! Each manager gets its own handle to the one store, exactly as the app
//! wires them up.

use std::sync::Arc;

use amity_core::directory::UserDirectory;
use amity_core::feed::FeedManager;
use amity_core::notify::NotificationDispatcher;
use amity_core::relationship::{RelationshipManager, UserId};
use amity_core::store::MemoryStore;

/// The full set of managers over one shared store.
#[allow(dead_code)] // Not every suite touches every manager.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub relationships: RelationshipManager<MemoryStore>,
    pub directory: UserDirectory<MemoryStore>,
    pub feed: FeedManager<MemoryStore>,
    pub notifications: NotificationDispatcher<MemoryStore>,
}

/// Creates a fresh app over an empty store.
pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    TestApp {
        relationships: RelationshipManager::new(Arc::clone(&store)),
        directory: UserDirectory::new(Arc::clone(&store)),
        feed: FeedManager::new(Arc::clone(&store)),
        notifications: NotificationDispatcher::new(Arc::clone(&store)),
        store,
    }
}

/// Signs up a user through the directory and returns their id.
pub async fn signup(app: &TestApp, id: &str, name: &str) -> UserId {
    app.directory
        .create_user(UserId::new(id), name, &format!("{id}@example.com"))
        .await
        .expect("should create user")
        .uid
}
