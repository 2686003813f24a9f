//! Inline message templates.
//!
//! The raw token is URL-encoded into the link so padding-free base64url
//! material survives any mail client that re-parses query strings.

pub struct RenderedMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

pub fn verification_link(base_url: &str, raw_token: &str) -> String {
    format!(
        "{}/auth/verify-email?token={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(raw_token)
    )
}

pub fn reset_link(base_url: &str, raw_token: &str) -> String {
    format!(
        "{}/auth/reset-password?token={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(raw_token)
    )
}

pub fn verification_message(base_url: &str, raw_token: &str) -> RenderedMessage {
    let link = verification_link(base_url, raw_token);
    RenderedMessage {
        subject: "Verify your email address".to_string(),
        html_body: format!(
            "<p>Welcome! Please confirm your email address by clicking the link below.</p>\
             <p><a href=\"{link}\">Verify my email</a></p>\
             <p>This link expires in 24 hours. If you did not create an account, you can ignore this message.</p>"
        ),
        text_body: format!(
            "Welcome! Please confirm your email address by opening this link:\n\n{link}\n\n\
             This link expires in 24 hours. If you did not create an account, you can ignore this message.\n"
        ),
    }
}

pub fn reset_message(base_url: &str, raw_token: &str) -> RenderedMessage {
    let link = reset_link(base_url, raw_token);
    RenderedMessage {
        subject: "Reset your password".to_string(),
        html_body: format!(
            "<p>A password reset was requested for your account.</p>\
             <p><a href=\"{link}\">Choose a new password</a></p>\
             <p>This link expires in 60 minutes. If you did not request a reset, you can ignore this message.</p>"
        ),
        text_body: format!(
            "A password reset was requested for your account. Open this link to choose a new password:\n\n{link}\n\n\
             This link expires in 60 minutes. If you did not request a reset, you can ignore this message.\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_encode_the_token() {
        let link = verification_link("https://app.example.com", "ab+cd/ef");
        assert_eq!(
            link,
            "https://app.example.com/auth/verify-email?token=ab%2Bcd%2Fef"
        );
    }

    #[test]
    fn test_trailing_slash_does_not_double_up() {
        let link = reset_link("https://app.example.com/", "tok");
        assert_eq!(
            link,
            "https://app.example.com/auth/reset-password?token=tok"
        );
    }

    #[test]
    fn test_messages_carry_the_link_in_both_bodies() {
        let msg = reset_message("https://app.example.com", "tok");
        assert!(msg.html_body.contains("/auth/reset-password?token=tok"));
        assert!(msg.text_body.contains("/auth/reset-password?token=tok"));
    }
}
