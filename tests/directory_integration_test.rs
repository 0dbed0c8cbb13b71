//! Integration tests for the user directory and notification dispatch.
//!
//! Covers signup, prefix search, profile updates, and the friend-request
//! notification flow (push token present vs. queued fallback) against the
//! shared in-memory store.

mod helpers;

use amity_core::directory::DirectoryError;
use amity_core::notify::{Delivery, NotificationKind};
use amity_core::relationship::UserId;
use helpers::{signup, test_app};

mod signup_tests {
    use super::*;

    #[tokio::test]
    async fn signup_then_lookup() {
        let app = test_app();
        let alice = signup(&app, "alice", "Alice").await;

        let record = app.directory.get_user(&alice).await.expect("user exists");
        assert_eq!(record.display_name, "Alice");
        assert_eq!(record.email, "alice@example.com");
        assert!(record.push_token.is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let app = test_app();
        signup(&app, "alice", "Alice").await;

        let err = app
            .directory
            .create_user(UserId::new("alice"), "Imposter", "other@example.com")
            .await
            .expect_err("duplicate id should fail");
        assert!(matches!(err, DirectoryError::AlreadyExists(_)));

        // The original record is untouched.
        let record = app
            .directory
            .get_user(&UserId::new("alice"))
            .await
            .expect("user exists");
        assert_eq!(record.display_name, "Alice");
    }
}

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn prefix_match_is_case_insensitive_and_excludes_viewer() {
        let app = test_app();
        let alice = signup(&app, "alice", "Alice").await;
        signup(&app, "alina", "Alina").await;
        signup(&app, "bob", "Bob").await;

        let results = app.directory.search("AL", &alice).await.expect("search");
        let names: Vec<_> = results.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alina"]);
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let app = test_app();
        let alice = signup(&app, "alice", "Alice").await;
        signup(&app, "bob", "Bob").await;

        let results = app.directory.search("", &alice).await.expect("search");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_reflects_renames() {
        let app = test_app();
        let viewer = signup(&app, "viewer", "Viewer").await;
        let bob = signup(&app, "bob", "Bob").await;

        app.directory
            .set_display_name(&bob, "Robert")
            .await
            .expect("rename should succeed");

        assert!(app
            .directory
            .search("bob", &viewer)
            .await
            .expect("search")
            .is_empty());
        let results = app.directory.search("rob", &viewer).await.expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].uid, bob);
    }
}

mod notification_tests {
    use super::*;

    #[tokio::test]
    async fn friend_request_notification_queues_without_token() {
        let app = test_app();
        let alice = signup(&app, "alice", "Alice").await;
        let bob = signup(&app, "bob", "Bob").await;

        app.relationships
            .send_request(&alice, &bob)
            .await
            .expect("request should succeed");
        let delivery = app
            .notifications
            .notify_friend_request(&bob, "Alice")
            .await
            .expect("notify should succeed");
        assert_eq!(delivery, Delivery::Queued);

        let unread = app.notifications.take_unread(&bob).await.expect("drain");
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].kind, NotificationKind::FriendRequest);
        assert_eq!(unread[0].sender_name, "Alice");

        // A second drain finds nothing: the first marked them read.
        assert!(app
            .notifications
            .take_unread(&bob)
            .await
            .expect("drain")
            .is_empty());
    }

    #[tokio::test]
    async fn friend_request_notification_uses_push_token_when_registered() {
        let app = test_app();
        let alice = signup(&app, "alice", "Alice").await;
        let bob = signup(&app, "bob", "Bob").await;

        app.directory
            .set_push_token(&bob, Some("device-token-42"))
            .await
            .expect("token registration should succeed");

        app.relationships
            .send_request(&alice, &bob)
            .await
            .expect("request should succeed");
        let delivery = app
            .notifications
            .notify_friend_request(&bob, "Alice")
            .await
            .expect("notify should succeed");
        assert_eq!(
            delivery,
            Delivery::Push {
                token: "device-token-42".to_string()
            }
        );

        // Nothing queued when the push channel takes it.
        assert!(app
            .notifications
            .take_unread(&bob)
            .await
            .expect("drain")
            .is_empty());
    }

    #[tokio::test]
    async fn clearing_token_falls_back_to_queueing() {
        let app = test_app();
        signup(&app, "alice", "Alice").await;
        let bob = signup(&app, "bob", "Bob").await;

        app.directory
            .set_push_token(&bob, Some("device-token-42"))
            .await
            .expect("token registration should succeed");
        app.directory
            .set_push_token(&bob, None)
            .await
            .expect("token clear should succeed");

        let delivery = app
            .notifications
            .notify_friend_request(&bob, "Alice")
            .await
            .expect("notify should succeed");
        assert_eq!(delivery, Delivery::Queued);
    }

    #[tokio::test]
    async fn queued_notifications_accumulate_per_user() {
        let app = test_app();
        signup(&app, "alice", "Alice").await;
        signup(&app, "cara", "Cara").await;
        let bob = signup(&app, "bob", "Bob").await;

        app.notifications
            .notify_friend_request(&bob, "Alice")
            .await
            .expect("notify should succeed");
        app.notifications
            .notify_friend_request(&bob, "Cara")
            .await
            .expect("notify should succeed");

        let unread = app.notifications.take_unread(&bob).await.expect("drain");
        assert_eq!(unread.len(), 2);
        let senders: Vec<_> = unread.iter().map(|n| n.sender_name.as_str()).collect();
        assert!(senders.contains(&"Alice"));
        assert!(senders.contains(&"Cara"));
    }
}

mod profile_tests {
    use super::*;

    #[tokio::test]
    async fn profile_updates_preserve_relationship_state() {
        let app = test_app();
        let alice = signup(&app, "alice", "Alice").await;
        let bob = signup(&app, "bob", "Bob").await;

        app.relationships
            .send_request(&alice, &bob)
            .await
            .expect("request should succeed");
        app.relationships
            .accept_request(&bob, &alice)
            .await
            .expect("accept should succeed");

        app.directory
            .set_profile_image(&alice, Some("https://x/alice.jpg"))
            .await
            .expect("image update should succeed");
        app.directory
            .set_display_name(&alice, "Alice B")
            .await
            .expect("rename should succeed");

        let record = app.directory.get_user(&alice).await.expect("user exists");
        assert_eq!(record.display_name, "Alice B");
        assert_eq!(record.profile_image.as_deref(), Some("https://x/alice.jpg"));
        assert_eq!(record.friends, vec![bob]);
    }
}
