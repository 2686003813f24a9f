//! Delivery transports.

pub mod file;
pub mod smtp;

pub use file::FileTransport;
pub use smtp::{SmtpTransport, TlsConfig};

use crate::{Email, MailerError};
use lettre::Message;
use lettre::message::{MultiPart, SinglePart};

/// Assemble a lettre [`Message`] from an [`Email`]. HTML and text together
/// become a multipart/alternative body.
pub(crate) fn build_message(email: Email) -> Result<Message, MailerError> {
    let mut builder = Message::builder()
        .from(email.from.parse()?)
        .to(email.to.parse()?)
        .subject(email.subject);

    if let Some(reply_to) = email.reply_to {
        builder = builder.reply_to(reply_to.parse()?);
    }

    let message = match (email.html_body, email.text_body) {
        (Some(html), Some(text)) => builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text))
                .singlepart(SinglePart::html(html)),
        )?,
        (Some(html), None) => builder.singlepart(SinglePart::html(html))?,
        (None, Some(text)) => builder.body(text)?,
        (None, None) => {
            return Err(MailerError::Builder("No email body provided".to_string()));
        }
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_multipart_message() {
        let email = Email {
            to: "user@example.com".to_string(),
            from: "noreply@example.com".to_string(),
            reply_to: None,
            subject: "Hello".to_string(),
            html_body: Some("<h1>Hi</h1>".to_string()),
            text_body: Some("Hi".to_string()),
        };

        assert!(build_message(email).is_ok());
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let email = Email {
            to: "not an address".to_string(),
            from: "noreply@example.com".to_string(),
            reply_to: None,
            subject: "Hello".to_string(),
            html_body: None,
            text_body: Some("Hi".to_string()),
        };

        assert!(matches!(
            build_message(email),
            Err(MailerError::Address(_))
        ));
    }
}
