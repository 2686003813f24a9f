//! Account lifecycle orchestrator
//!
//! Drives the register / verify-email / resend-verify / login /
//! forgot-password / reset-password flows over the injected account and
//! token repositories.
//!
//! Two response disciplines coexist here on purpose:
//!
//! - `resend_verify` and `forgot_password` are anti-enumeration endpoints:
//!   they report success identically whether or not the account exists, and
//!   even when the supplied input is malformed.
//! - `login` reveals "exists but unverified" as a distinct failure once a
//!   known email was supplied. That asymmetry is a product decision carried
//!   over from the upstream system, not an oversight.

use std::sync::Arc;

use chrono::Duration;

use crate::{
    CredentialHasher, Error,
    account::{Account, NewAccount, Role},
    error::{AuthError, StorageError, ValidationError},
    repositories::{AccountRepository, TokenRepository},
    services::Notifier,
    token::{IssuedToken, TokenPurpose},
    validation::{
        normalize_display_name, normalize_email, validate_email, validate_password,
        validate_token_shape,
    },
};

/// Verification links stay valid for a day.
const VERIFY_EMAIL_TTL: Duration = Duration::hours(24);

/// Reset links are short-lived.
const RESET_PASSWORD_TTL: Duration = Duration::minutes(60);

/// Registration input, prior to validation and normalization.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub role: Option<Role>,
}

/// The state machine tying accounts, tokens, hasher and notifier together.
pub struct AuthService<A: AccountRepository, T: TokenRepository> {
    accounts: Arc<A>,
    tokens: Arc<T>,
    hasher: Arc<CredentialHasher>,
    notifier: Arc<dyn Notifier>,
}

impl<A: AccountRepository, T: TokenRepository> AuthService<A, T> {
    pub fn new(
        accounts: Arc<A>,
        tokens: Arc<T>,
        hasher: Arc<CredentialHasher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
            notifier,
        }
    }

    /// Register a new account in `Unverified` state and send a verification
    /// link.
    ///
    /// A taken email surfaces as [`StorageError::Duplicate`] straight from
    /// the store's uniqueness constraint. Delivery failure does not roll
    /// back the created account.
    pub async fn register(&self, registration: Registration) -> Result<Account, Error> {
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
        tracing::info!(account_id = %account.id, "account registered");

        let token = self
            .issue_token(&account, TokenPurpose::VerifyEmail, VERIFY_EMAIL_TTL)
            .await?;
        self.deliver_verification(&account, &token).await;

        Ok(account)
    }

    /// Authenticate with email and password.
    ///
    /// Missing account and wrong password are indistinguishable. An
    /// unverified account fails with [`AuthError::EmailNotVerified`] before
    /// the credential is even checked, matching the upstream flow.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, Error> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password is required".to_string()).into());
        }
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.is_email_verified() {
            return Err(AuthError::EmailNotVerified.into());
        }

        let stored_hash = self
            .accounts
            .credential_hash(&account.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&stored_hash, password)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(account)
    }

    /// Consume a verification token and transition the account to
    /// `Verified`.
    ///
    /// Retrying with the same raw token after success fails with the
    /// generic not-found error: the token is spent, which is the point of
    /// single use.
    pub async fn verify_email(&self, raw_token: &str) -> Result<Account, Error> {
        validate_token_shape(raw_token)?;

        let account_id = self
            .tokens
            .consume(raw_token, TokenPurpose::VerifyEmail)
            .await?
            .ok_or(StorageError::NotFound)?;

        self.accounts.mark_email_verified(&account_id).await?;
        tracing::info!(%account_id, "email verified");

        self.accounts
            .find_by_id(&account_id)
            .await?
            .ok_or_else(|| StorageError::NotFound.into())
    }

    /// Re-send a verification link.
    ///
    /// Reports success regardless of input: a token is issued and delivered
    /// only when the account exists and is still unverified.
    pub async fn resend_verify(&self, email: &str) -> Result<(), Error> {
        let email = normalize_email(email);
        if validate_email(&email).is_err() {
            return Ok(());
        }

        if let Some(account) = self.accounts.find_by_email(&email).await? {
            if !account.is_email_verified() {
                let token = self
                    .issue_token(&account, TokenPurpose::VerifyEmail, VERIFY_EMAIL_TTL)
                    .await?;
                self.deliver_verification(&account, &token).await;
            }
        }

        Ok(())
    }

    /// Start a password reset.
    ///
    /// Reports success regardless of input: a reset token is issued and
    /// delivered only when the account exists and is verified.
    pub async fn forgot_password(&self, email: &str) -> Result<(), Error> {
        let email = normalize_email(email);
        if validate_email(&email).is_err() {
            return Ok(());
        }

        if let Some(account) = self.accounts.find_by_email(&email).await? {
            if account.is_email_verified() {
                let token = self
                    .issue_token(&account, TokenPurpose::ResetPassword, RESET_PASSWORD_TTL)
                    .await?;
                if let Err(e) = self
                    .notifier
                    .password_reset_requested(&account.email, &token.raw)
                    .await
                {
                    tracing::warn!(account_id = %account.id, error = %e, "reset email delivery failed");
                }
            }
        }

        Ok(())
    }

    /// Consume a reset token and overwrite the account credential.
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<(), Error> {
        validate_token_shape(raw_token)?;
        validate_password(new_password)?;

        let account_id = self
            .tokens
            .consume(raw_token, TokenPurpose::ResetPassword)
            .await?
            .ok_or(StorageError::NotFound)?;

        let new_hash = self.hasher.hash(new_password)?;
        self.accounts.update_credential(&account_id, &new_hash).await?;
        tracing::info!(%account_id, "credential reset");

        Ok(())
    }

    /// Reclaim used and expired token records.
    pub async fn purge_expired_tokens(&self) -> Result<u64, Error> {
        self.tokens.purge_expired().await
    }

    /// Issue a token, retrying once if the digest collides with an existing
    /// record.
    async fn issue_token(
        &self,
        account: &Account,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<IssuedToken, Error> {
        match self.tokens.issue(&account.id, purpose, ttl).await {
            Err(e) if e.is_duplicate() => {
                tracing::warn!(account_id = %account.id, %purpose, "token digest collision, regenerating");
                self.tokens.issue(&account.id, purpose, ttl).await
            }
            other => other,
        }
    }

    async fn deliver_verification(&self, account: &Account, token: &IssuedToken) {
        if let Err(e) = self
            .notifier
            .verification_requested(&account.email, &token.raw)
            .await
        {
            tracing::warn!(account_id = %account.id, error = %e, "verification email delivery failed");
        }
    }
}
