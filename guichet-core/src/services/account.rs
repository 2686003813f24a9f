//! Administrative account operations: listing, lookup, profile patching
//! and soft deletion.

use std::sync::Arc;

use crate::{
    CredentialHasher, Error,
    account::{Account, AccountId, AccountPatch, NewAccount, Role},
    error::{StorageError, ValidationError},
    repositories::AccountRepository,
    services::Registration,
    validation::{normalize_display_name, normalize_email, validate_email, validate_password},
};

/// Default page size when the caller does not ask for one.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

pub struct AccountService<A: AccountRepository> {
    accounts: Arc<A>,
    hasher: Arc<CredentialHasher>,
}

impl<A: AccountRepository> AccountService<A> {
    pub fn new(accounts: Arc<A>, hasher: Arc<CredentialHasher>) -> Self {
        Self { accounts, hasher }
    }

    /// Create an account on behalf of an administrator. Unlike
    /// self-registration this issues no verification token and sends no
    /// mail; the account starts unverified until the owner runs the
    /// resend-verify flow.
    pub async fn create(&self, registration: Registration) -> Result<Account, Error> {
        let email = normalize_email(&registration.email);
        validate_email(&email)?;
        validate_password(&registration.password)?;
        let display_name = normalize_display_name(registration.display_name.as_deref())?;

        let credential_hash = self.hasher.hash(&registration.password)?;

        let draft = NewAccount::builder()
            .email(email)
            .credential_hash(credential_hash)
            .role(registration.role.unwrap_or_default())
            .display_name(display_name)
            .build()?;

        let account = self.accounts.create(draft).await?;
        tracing::info!(account_id = %account.id, "account created by admin");
        Ok(account)
    }

    /// List live accounts, capped at `limit`.
    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<Account>, Error> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 1000);
        self.accounts.list(limit).await
    }

    /// Fetch a single live account.
    pub async fn get(&self, id: &AccountId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::NotFound.into())
    }

    /// Patch profile fields. A present-but-empty display name clears it;
    /// an absent field is left alone. A patch with nothing in it is a
    /// validation error, not a no-op.
    pub async fn update(
        &self,
        id: &AccountId,
        display_name: Option<String>,
        role: Option<Role>,
    ) -> Result<Account, Error> {
        if display_name.is_none() && role.is_none() {
            return Err(
                ValidationError::MissingField("Nothing to update".to_string()).into(),
            );
        }

        let display_name = match display_name {
            Some(name) if name.trim().is_empty() => Some(String::new()),
            Some(name) => normalize_display_name(Some(&name))?,
            None => None,
        };

        let patch = AccountPatch { display_name, role };
        let account = self
            .accounts
            .apply_patch(id, &patch)
            .await?
            .ok_or(StorageError::NotFound)?;
        tracing::info!(account_id = %id, "account updated");
        Ok(account)
    }

    /// Soft-delete an account. Its email immediately becomes available for
    /// re-registration.
    pub async fn remove(&self, id: &AccountId) -> Result<(), Error> {
        if !self.accounts.soft_delete(id).await? {
            return Err(StorageError::NotFound.into());
        }
        tracing::info!(account_id = %id, "account soft-deleted");
        Ok(())
    }
}
