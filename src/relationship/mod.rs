//! Friend relationship protocol.
//!
//! Five atomic state transitions over pairs of user records (send, accept,
//! decline, cancel, remove) plus a read-only status derivation. The
//! transitions themselves are pure functions in [`transition`]; the
//! [`RelationshipManager`] executes them inside the store's two-record
//! transactions so that the invariants hold under concurrent access from
//! multiple devices:
//!
//! - Symmetry: `a` is in `b.friends` iff `b` is in `a.friends`.
//! - Sent/received consistency: `a` is in `b`'s received list iff `b` is in
//!   `a`'s sent list.
//! - No self-relationship.
//! - A pair is in at most one of {pending request, friends}.

pub mod error;
pub mod manager;
pub mod transition;
pub mod types;

pub use error::{RelationshipError, Result};
pub use manager::RelationshipManager;
pub use types::{FriendStatus, PairUpdate, UserId, UserRecord};
