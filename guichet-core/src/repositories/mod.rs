//! Repository traits for the storage layer
//!
//! Services never hold a storage connection themselves: they are handed
//! repository implementations explicitly (an injected capability with its
//! own lifecycle), which keeps the orchestrator testable against in-memory
//! doubles.
//!
//! Backends implement the individual `*Repository` traits, the matching
//! `*RepositoryProvider` accessors, and the [`RepositoryProvider`]
//! supertrait that adds lifecycle operations (startup provisioning, health
//! check).

pub mod account;
pub mod adapter;
pub mod token;

pub use account::AccountRepository;
pub use adapter::{AccountRepositoryAdapter, TokenRepositoryAdapter};
pub use token::TokenRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for account repository access.
pub trait AccountRepositoryProvider: Send + Sync + 'static {
    type AccountRepo: AccountRepository;

    fn accounts(&self) -> &Self::AccountRepo;
}

/// Provider trait for token repository access.
pub trait TokenRepositoryProvider: Send + Sync + 'static {
    type TokenRepo: TokenRepository;

    fn tokens(&self) -> &Self::TokenRepo;
}

/// Full storage backend: all repositories plus lifecycle.
///
/// `provision` must be idempotent — it is the single place where tables and
/// indexes come into existence, run once at startup and never from request
/// paths.
#[async_trait]
pub trait RepositoryProvider: AccountRepositoryProvider + TokenRepositoryProvider {
    /// Create tables and indexes if they do not exist yet.
    async fn provision(&self) -> Result<(), Error>;

    /// Cheap connectivity check.
    async fn health_check(&self) -> Result<(), Error>;
}
