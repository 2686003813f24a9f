use async_trait::async_trait;
use guichet_core::services::{Notifier, NotifyError};

use crate::templates::{RenderedMessage, reset_message, verification_message};
use crate::{Email, Mailer};

/// Bridges the core `Notifier` seam onto a concrete mail transport.
pub struct MailNotifier<M: Mailer> {
    mailer: M,
    from: String,
    base_url: String,
}

impl<M: Mailer> MailNotifier<M> {
    pub fn new(mailer: M, from: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            base_url: base_url.into(),
        }
    }

    async fn deliver(&self, to: &str, message: RenderedMessage) -> Result<(), NotifyError> {
        let email = Email::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .html_body(message.html_body)
            .text_body(message.text_body)
            .build()
            .map_err(|e| NotifyError(e.to_string()))?;

        self.mailer
            .send_email(email)
            .await
            .map_err(|e| NotifyError(e.to_string()))
    }
}

#[async_trait]
impl<M: Mailer> Notifier for MailNotifier<M> {
    async fn verification_requested(
        &self,
        email: &str,
        raw_token: &str,
    ) -> Result<(), NotifyError> {
        tracing::debug!(to = %email, "sending verification email");
        self.deliver(email, verification_message(&self.base_url, raw_token))
            .await
    }

    async fn password_reset_requested(
        &self,
        email: &str,
        raw_token: &str,
    ) -> Result<(), NotifyError> {
        tracing::debug!(to = %email, "sending password reset email");
        self.deliver(email, reset_message(&self.base_url, raw_token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MailerError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingMailer {
        sent: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl Mailer for CapturingMailer {
        async fn send_email(&self, email: Email) -> Result<(), MailerError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_verification_email_carries_link_and_addresses() {
        let notifier = MailNotifier::new(
            CapturingMailer::default(),
            "noreply@example.com",
            "https://app.example.com",
        );

        notifier
            .verification_requested("user@example.com", "raw-token")
            .await
            .unwrap();

        let sent = notifier.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
        assert_eq!(sent[0].from, "noreply@example.com");
        assert!(
            sent[0]
                .text_body
                .as_deref()
                .unwrap()
                .contains("/auth/verify-email?token=raw-token")
        );
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_notify_error() {
        struct FailingMailer;

        #[async_trait]
        impl Mailer for FailingMailer {
            async fn send_email(&self, _email: Email) -> Result<(), MailerError> {
                Err(MailerError::Builder("relay down".to_string()))
            }
        }

        let notifier =
            MailNotifier::new(FailingMailer, "noreply@example.com", "https://app.example.com");

        let err = notifier
            .password_reset_requested("user@example.com", "raw-token")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("relay down"));
    }
}
