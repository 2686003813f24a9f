//! Repository implementations for SQLite storage

pub mod account;
pub mod token;

pub use account::SqliteAccountRepository;
pub use token::SqliteTokenRepository;

use async_trait::async_trait;
use guichet_core::{
    Error,
    error::StorageError,
    repositories::{AccountRepositoryProvider, RepositoryProvider, TokenRepositoryProvider},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository provider implementation for SQLite.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    accounts: Arc<SqliteAccountRepository>,
    tokens: Arc<SqliteTokenRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let accounts = Arc::new(SqliteAccountRepository::new(pool.clone()));
        let tokens = Arc::new(SqliteTokenRepository::new(pool.clone()));

        Self {
            pool,
            accounts,
            tokens,
        }
    }
}

impl AccountRepositoryProvider for SqliteRepositoryProvider {
    type AccountRepo = SqliteAccountRepository;

    fn accounts(&self) -> &Self::AccountRepo {
        &self.accounts
    }
}

impl TokenRepositoryProvider for SqliteRepositoryProvider {
    type TokenRepo = SqliteTokenRepository;

    fn tokens(&self) -> &Self::TokenRepo {
        &self.tokens
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn provision(&self) -> Result<(), Error> {
        crate::schema::provision(&self.pool).await
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let provider = SqliteRepositoryProvider::new(pool);

        provider.provision().await.unwrap();
        provider.provision().await.unwrap();
        provider.health_check().await.unwrap();
    }
}
