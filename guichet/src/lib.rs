//! # Guichet
//!
//! Guichet manages the full lifecycle of single-use, time-bounded
//! credentials: opaque tokens that gate email verification and password
//! reset for a password-authenticated account store. Only a SHA-256 digest
//! of each token is ever persisted; consumption is a single atomic
//! conditional update, so a token survives exactly one successful use.
//!
//! The [`Guichet`] handle wires the orchestrator services from a storage
//! backend and exposes every operation of the service. The ready-made HTTP
//! surface lives in `guichet-axum`; `guichet-mailer` delivers the links.
//!
//! ## Example
//!
//! ```rust,no_run
//! use guichet::Guichet;
//! use guichet_storage_sqlite::SqliteRepositoryProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!
//!     let guichet = Guichet::new(repositories);
//!     guichet.provision().await.unwrap();
//! }
//! ```

use std::sync::Arc;

use guichet_core::repositories::{
    AccountRepositoryAdapter, RepositoryProvider, TokenRepositoryAdapter,
};
use guichet_core::services::{AccountService, AuthService, Notifier, NullNotifier};

pub use guichet_core::{
    Account, AccountId, AuthError, CredentialHasher, Error, IssuedToken, NewAccount, Role,
    StorageError, TokenPurpose, ValidationError, services::Registration,
};
pub use guichet_storage_sqlite::SqliteRepositoryProvider;

/// The service handle: orchestrator services wired from one repository
/// provider.
pub struct Guichet<R: RepositoryProvider> {
    repositories: Arc<R>,
    auth_service: Arc<AuthService<AccountRepositoryAdapter<R>, TokenRepositoryAdapter<R>>>,
    account_service: Arc<AccountService<AccountRepositoryAdapter<R>>>,
}

impl<R: RepositoryProvider> Guichet<R> {
    /// Wire services with the default hasher and no out-of-band delivery.
    /// Production setups pass a real notifier via [`Guichet::with_collaborators`].
    pub fn new(repositories: Arc<R>) -> Self {
        Self::with_collaborators(
            repositories,
            Arc::new(CredentialHasher::default()),
            Arc::new(NullNotifier),
        )
    }

    pub fn with_collaborators(
        repositories: Arc<R>,
        hasher: Arc<CredentialHasher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let account_repo = Arc::new(AccountRepositoryAdapter::new(repositories.clone()));
        let token_repo = Arc::new(TokenRepositoryAdapter::new(repositories.clone()));

        let auth_service = Arc::new(AuthService::new(
            account_repo.clone(),
            token_repo,
            hasher.clone(),
            notifier,
        ));
        let account_service = Arc::new(AccountService::new(account_repo, hasher));

        Self {
            repositories,
            auth_service,
            account_service,
        }
    }

    /// Create tables and indexes if missing. Run once at startup.
    pub async fn provision(&self) -> Result<(), Error> {
        self.repositories.provision().await
    }

    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    pub async fn register(&self, registration: Registration) -> Result<Account, Error> {
        self.auth_service.register(registration).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Account, Error> {
        self.auth_service.login(email, password).await
    }

    pub async fn verify_email(&self, raw_token: &str) -> Result<Account, Error> {
        self.auth_service.verify_email(raw_token).await
    }

    pub async fn resend_verify(&self, email: &str) -> Result<(), Error> {
        self.auth_service.resend_verify(email).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), Error> {
        self.auth_service.forgot_password(email).await
    }

    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<(), Error> {
        self.auth_service.reset_password(raw_token, new_password).await
    }

    pub async fn purge_expired_tokens(&self) -> Result<u64, Error> {
        self.auth_service.purge_expired_tokens().await
    }

    /// Admin-side account creation: no verification token is issued.
    pub async fn create_account(&self, registration: Registration) -> Result<Account, Error> {
        self.account_service.create(registration).await
    }

    pub async fn list_accounts(&self, limit: Option<i64>) -> Result<Vec<Account>, Error> {
        self.account_service.list(limit).await
    }

    pub async fn get_account(&self, id: &AccountId) -> Result<Account, Error> {
        self.account_service.get(id).await
    }

    pub async fn update_account(
        &self,
        id: &AccountId,
        display_name: Option<String>,
        role: Option<Role>,
    ) -> Result<Account, Error> {
        self.account_service.update(id, display_name, role).await
    }

    pub async fn remove_account(&self, id: &AccountId) -> Result<(), Error> {
        self.account_service.remove(id).await
    }

    /// Service handles, for callers assembling their own HTTP state.
    pub fn auth_service(
        &self,
    ) -> Arc<AuthService<AccountRepositoryAdapter<R>, TokenRepositoryAdapter<R>>> {
        self.auth_service.clone()
    }

    pub fn account_service(&self) -> Arc<AccountService<AccountRepositoryAdapter<R>>> {
        self.account_service.clone()
    }

    pub fn repositories(&self) -> Arc<R> {
        self.repositories.clone()
    }
}
