use async_trait::async_trait;
use chrono::Duration;

use crate::{
    Error,
    account::AccountId,
    token::{IssuedToken, TokenPurpose},
};

/// Repository for single-use token data access.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Generate and persist a new token for `account_id`, valid for `ttl`.
    ///
    /// Fails with [`crate::StorageError::Duplicate`] only on the
    /// astronomically unlikely digest collision; the caller may retry
    /// generation.
    async fn issue(
        &self,
        account_id: &AccountId,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<IssuedToken, Error>;

    /// Atomically consume a raw token presented for `purpose`.
    ///
    /// Looks up the live record matching the digest and purpose and, if it
    /// has not expired, marks it used and returns the owning account id.
    /// Lookup and mark MUST be one atomic conditional update in the store,
    /// so that of N concurrent attempts with the same raw token exactly one
    /// returns `Some`.
    ///
    /// Returns `None` for unknown, expired and already-used tokens alike.
    async fn consume(
        &self,
        raw_token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<AccountId>, Error>;

    /// Remove used and expired records. Hygiene only — `consume` never
    /// trusts reclamation for correctness. Returns the number of rows
    /// reclaimed.
    async fn purge_expired(&self) -> Result<u64, Error>;
}
