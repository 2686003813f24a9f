//! Adapters that turn a [`RepositoryProvider`] into the individual
//! repository traits, so services can be generic over single repositories
//! while the application wires everything from one provider handle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use crate::{
    Error,
    account::{Account, AccountId, AccountPatch, NewAccount},
    repositories::{AccountRepository, RepositoryProvider, TokenRepository},
    token::{IssuedToken, TokenPurpose},
};

pub struct AccountRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AccountRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AccountRepository for AccountRepositoryAdapter<R> {
    async fn create(&self, draft: NewAccount) -> Result<Account, Error> {
        self.provider.accounts().create(draft).await
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        self.provider.accounts().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        self.provider.accounts().find_by_email(email).await
    }

    async fn list(&self, limit: i64) -> Result<Vec<Account>, Error> {
        self.provider.accounts().list(limit).await
    }

    async fn apply_patch(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, Error> {
        self.provider.accounts().apply_patch(id, patch).await
    }

    async fn mark_email_verified(&self, id: &AccountId) -> Result<(), Error> {
        self.provider.accounts().mark_email_verified(id).await
    }

    async fn update_credential(&self, id: &AccountId, new_hash: &str) -> Result<(), Error> {
        self.provider.accounts().update_credential(id, new_hash).await
    }

    async fn credential_hash(&self, id: &AccountId) -> Result<Option<String>, Error> {
        self.provider.accounts().credential_hash(id).await
    }

    async fn soft_delete(&self, id: &AccountId) -> Result<bool, Error> {
        self.provider.accounts().soft_delete(id).await
    }
}

pub struct TokenRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> TokenRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> TokenRepository for TokenRepositoryAdapter<R> {
    async fn issue(
        &self,
        account_id: &AccountId,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<IssuedToken, Error> {
        self.provider.tokens().issue(account_id, purpose, ttl).await
    }

    async fn consume(
        &self,
        raw_token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<AccountId>, Error> {
        self.provider.tokens().consume(raw_token, purpose).await
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        self.provider.tokens().purge_expired().await
    }
}
