//! Out-of-band delivery seam
//!
//! The orchestrator hands freshly generated raw tokens to a [`Notifier`]
//! and moves on: delivery failure is logged by the caller and never rolls
//! back the transition that produced the token.

use async_trait::async_trait;
use thiserror::Error;

/// Opaque delivery failure. Carries a message for the log line and nothing
/// the HTTP layer could leak.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// Delivers lifecycle messages to an out-of-band channel (email).
///
/// `raw_token` is the only copy of the secret; implementations embed it in
/// a link and must not persist it.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// A verify-email token was issued for `email`.
    async fn verification_requested(&self, email: &str, raw_token: &str)
    -> Result<(), NotifyError>;

    /// A reset-password token was issued for `email`.
    async fn password_reset_requested(
        &self,
        email: &str,
        raw_token: &str,
    ) -> Result<(), NotifyError>;
}

/// Notifier that drops everything on the floor, for tests and offline
/// tooling.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn verification_requested(
        &self,
        email: &str,
        _raw_token: &str,
    ) -> Result<(), NotifyError> {
        tracing::debug!(email, "discarding verification notification");
        Ok(())
    }

    async fn password_reset_requested(
        &self,
        email: &str,
        _raw_token: &str,
    ) -> Result<(), NotifyError> {
        tracing::debug!(email, "discarding password reset notification");
        Ok(())
    }
}
