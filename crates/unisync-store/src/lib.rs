//! # unisync-store
//!
//! The client's persisted local storage, backed by SQLite.
//!
//! Only two things survive a restart: the bearer token and the user's
//! settings. Both live in a single key/value table exposed through
//! [`Database::get_item`] and friends. The in-memory query cache is never
//! persisted.

pub mod database;
pub mod local_storage;
pub mod migrations;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
