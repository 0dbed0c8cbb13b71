//! Pure state transitions of the friend relationship protocol.
//!
//! Each transition is a function from the current pair of stored records to
//! the updated pair, or a validation error. The functions are free of I/O so
//! they can be tested in isolation; the store runs them inside its
//! transactional retry loop, which is what makes them atomic with respect to
//! concurrent writers.
//!
//! In every function `actor` is the user invoking the operation and `peer`
//! is the target. For [`accept_request`] and [`decline_request`] the actor is
//! the receiver of the original request; for [`cancel_request`] the actor is
//! the original sender.

use super::error::RelationshipError;
use super::types::{insert_unique, remove_id, PairUpdate, UserRecord};

/// Records a new friend request from `actor` to `peer`.
///
/// # Errors
///
/// Fails with [`RelationshipError::SelfReference`] if actor and peer are the
/// same user, [`RelationshipError::AlreadyFriends`] if the pair is already
/// in the friends state, and [`RelationshipError::RequestAlreadyPending`] if
/// a request is outstanding in either direction (a pending reverse request
/// should be accepted instead of duplicated).
pub fn send_request(
    actor: &UserRecord,
    peer: &UserRecord,
) -> Result<PairUpdate, RelationshipError> {
    if actor.uid == peer.uid {
        return Err(RelationshipError::SelfReference);
    }
    if actor.has_friend(&peer.uid) {
        return Err(RelationshipError::AlreadyFriends(peer.uid.clone()));
    }
    if actor.has_sent_request(&peer.uid) || peer.has_received_request(&actor.uid) {
        return Err(RelationshipError::RequestAlreadyPending(peer.uid.clone()));
    }
    // Reverse request pending: the symmetric duplicate guard.
    if actor.has_received_request(&peer.uid) || peer.has_sent_request(&actor.uid) {
        return Err(RelationshipError::RequestAlreadyPending(peer.uid.clone()));
    }

    let mut actor = actor.clone();
    let mut peer = peer.clone();
    insert_unique(&mut actor.friend_requests_sent, &peer.uid);
    insert_unique(&mut peer.friend_requests_received, &actor.uid);
    Ok(PairUpdate { actor, peer })
}

/// Converts a pending request from `peer` into a symmetric friendship.
///
/// # Errors
///
/// Fails with [`RelationshipError::NoPendingRequest`] if `peer` has no
/// outstanding request to `actor`.
pub fn accept_request(
    actor: &UserRecord,
    peer: &UserRecord,
) -> Result<PairUpdate, RelationshipError> {
    if !actor.has_received_request(&peer.uid) {
        return Err(RelationshipError::NoPendingRequest(peer.uid.clone()));
    }

    let mut actor = actor.clone();
    let mut peer = peer.clone();
    remove_id(&mut actor.friend_requests_received, &peer.uid);
    remove_id(&mut peer.friend_requests_sent, &actor.uid);
    insert_unique(&mut actor.friends, &peer.uid);
    insert_unique(&mut peer.friends, &actor.uid);
    Ok(PairUpdate { actor, peer })
}

/// Discards a pending request from `peer` without creating a friendship.
///
/// # Errors
///
/// Fails with [`RelationshipError::NoPendingRequest`] if `peer` has no
/// outstanding request to `actor`.
pub fn decline_request(
    actor: &UserRecord,
    peer: &UserRecord,
) -> Result<PairUpdate, RelationshipError> {
    if !actor.has_received_request(&peer.uid) {
        return Err(RelationshipError::NoPendingRequest(peer.uid.clone()));
    }

    let mut actor = actor.clone();
    let mut peer = peer.clone();
    remove_id(&mut actor.friend_requests_received, &peer.uid);
    remove_id(&mut peer.friend_requests_sent, &actor.uid);
    Ok(PairUpdate { actor, peer })
}

/// Withdraws a request the `actor` previously sent to `peer`.
///
/// # Errors
///
/// Fails with [`RelationshipError::NoPendingRequest`] if `actor` has no
/// outstanding request to `peer`.
pub fn cancel_request(
    actor: &UserRecord,
    peer: &UserRecord,
) -> Result<PairUpdate, RelationshipError> {
    if !actor.has_sent_request(&peer.uid) {
        return Err(RelationshipError::NoPendingRequest(peer.uid.clone()));
    }

    let mut actor = actor.clone();
    let mut peer = peer.clone();
    remove_id(&mut actor.friend_requests_sent, &peer.uid);
    remove_id(&mut peer.friend_requests_received, &actor.uid);
    Ok(PairUpdate { actor, peer })
}

/// Dissolves a symmetric friendship between `actor` and `peer`.
///
/// # Errors
///
/// Fails with [`RelationshipError::NotFriends`] unless the friendship holds
/// on both sides.
pub fn remove_friend(
    actor: &UserRecord,
    peer: &UserRecord,
) -> Result<PairUpdate, RelationshipError> {
    if !actor.has_friend(&peer.uid) || !peer.has_friend(&actor.uid) {
        return Err(RelationshipError::NotFriends(peer.uid.clone()));
    }

    let mut actor = actor.clone();
    let mut peer = peer.clone();
    remove_id(&mut actor.friends, &peer.uid);
    remove_id(&mut peer.friends, &actor.uid);
    Ok(PairUpdate { actor, peer })
}
