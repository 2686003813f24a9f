use async_trait::async_trait;

use crate::{
    Error,
    account::{Account, AccountId, AccountPatch, NewAccount},
};

/// Repository for account data access.
///
/// Every read excludes soft-deleted rows. Every mutation refreshes
/// `updated_at`. Email uniqueness is the store's job (a unique constraint
/// over live rows), never a check-then-insert in the caller.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Create a new account.
    ///
    /// Fails with [`crate::StorageError::Duplicate`] when the normalized
    /// email already belongs to a non-deleted account.
    async fn create(&self, draft: NewAccount) -> Result<Account, Error>;

    /// Find a live account by id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error>;

    /// Find a live account by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error>;

    /// List live accounts, most recent first, at most `limit` rows.
    async fn list(&self, limit: i64) -> Result<Vec<Account>, Error>;

    /// Apply an administrative patch. Returns the updated account, or
    /// `None` when no live account matches.
    async fn apply_patch(&self, id: &AccountId, patch: &AccountPatch)
    -> Result<Option<Account>, Error>;

    /// Transition the account to `Verified`.
    async fn mark_email_verified(&self, id: &AccountId) -> Result<(), Error>;

    /// Overwrite the stored credential hash.
    async fn update_credential(&self, id: &AccountId, new_hash: &str) -> Result<(), Error>;

    /// Fetch the credential hash of a live account. The hash never travels
    /// further than the credential check.
    async fn credential_hash(&self, id: &AccountId) -> Result<Option<String>, Error>;

    /// Soft-delete an account. Returns `false` when no live account matched.
    async fn soft_delete(&self, id: &AccountId) -> Result<bool, Error>;
}
