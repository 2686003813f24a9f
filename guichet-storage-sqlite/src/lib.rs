//! SQLite storage backend for guichet.
//!
//! Timestamps are stored as integer unix seconds. Email uniqueness over
//! live accounts and digest uniqueness over tokens are enforced by the
//! schema, never re-checked in application code.

mod schema;

pub mod repositories;

pub use repositories::{SqliteAccountRepository, SqliteRepositoryProvider, SqliteTokenRepository};
