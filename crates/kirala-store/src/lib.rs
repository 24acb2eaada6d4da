//! # kirala-store
//!
//! Local storage for the Oyna-Kirala marketplace, backed by SQLite.
//!
//! The crate plays the role of the hosted document store the mobile client
//! talks to: typed CRUD helpers per collection, merge-upserts where the
//! original relied on them, change notification for real-time views, and the
//! one multi-document transaction the domain needs (renting a toy flips the
//! listing and records the rental atomically, guarded by a
//! compare-and-swap on availability).
//!
//! A file-backed [`MediaStore`] stands in for the blob store.

pub mod database;
pub mod friends;
pub mod media;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod rentals;
pub mod rooms;
pub mod settings;
pub mod toys;
pub mod users;
pub mod watch;

mod error;

#[cfg(test)]
pub(crate) mod test_support;

pub use database::Database;
pub use error::StoreError;
pub use media::{MediaStore, StoredImage};
pub use models::*;
pub use rentals::TransitionOutcome;
pub use toys::ToyUpdate;
pub use users::ProfileUpdate;
pub use watch::{Collection, StoreEvent};
