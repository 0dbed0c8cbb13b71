//! Amity Core Library
//!
//! Core functionality for Amity - mobile social networking.
//! This crate provides the business logic of the app (friend relationships,
//! the content feed, the user directory, and notification dispatch) on top
//! of a remote document store passed in as an explicit capability.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

pub mod directory;
pub mod feed;
pub mod notify;
pub mod relationship;
pub mod store;
