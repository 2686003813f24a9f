//! Input validation and normalization
//!
//! Single source of truth for the field rules shared by the registration,
//! login and token flows. Validation failures are recovered at the API
//! boundary and reported with field detail; everything here is
//! shape-checking only and touches no storage.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Maximum stored display name length in characters.
const DISPLAY_NAME_MAX: usize = 64;

/// Minimum plausible raw token length; anything shorter is rejected before
/// touching the store.
const TOKEN_MIN_LEN: usize = 10;

/// Normalize an email for storage and lookup: trim then lowercase.
///
/// Uniqueness and all matching operate on the normalized form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address shape.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Validate a password: 8..=128 characters, not whitespace-only.
///
/// There is no further strength policy.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    if password.len() < 8 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be no more than 128 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Validate and normalize an optional display name.
///
/// Trims; an empty result collapses to `None`. A display name must not look
/// like an email address, so a stolen name cannot impersonate a contact.
pub fn normalize_display_name(
    display_name: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    let Some(name) = display_name else {
        return Ok(None);
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > DISPLAY_NAME_MAX {
        return Err(ValidationError::InvalidField(format!(
            "Display name must be at most {DISPLAY_NAME_MAX} characters"
        )));
    }

    if EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidField(
            "Display name must not be an email address".to_string(),
        ));
    }

    Ok(Some(trimmed.to_string()))
}

/// Cheap shape check on a raw token before any store lookup.
pub fn validate_token_shape(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::MissingField(
            "Token is required".to_string(),
        ));
    }

    if token.len() < TOKEN_MIN_LEN {
        return Err(ValidationError::InvalidField(
            "Token is malformed".to_string(),
        ));
    }

    Ok(())
}
