//! Email delivery for guichet.
//!
//! A [`Mailer`] is a transport (SMTP or file-based for local runs); the
//! [`MailNotifier`] sits on top of one and implements the core
//! `Notifier` trait, turning raw token material into clickable links.

pub mod email;
pub mod error;
pub mod mailer;
pub mod notifier;
pub mod templates;
pub mod transports;

pub use email::{Email, EmailBuilder};
pub use error::MailerError;
pub use mailer::Mailer;
pub use notifier::MailNotifier;
pub use transports::{FileTransport, SmtpTransport, TlsConfig};
