//! Opaque prefixed record identifiers
//!
//! Record ids carry a short type prefix (`acct`, `tok`) followed by at least
//! 96 bits of randomness, URL-safe encoded. They are opaque: nothing should
//! parse meaning out of them beyond the prefix.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Generate a prefixed id of the form `{prefix}_{random}`.
///
/// The random part is 12 bytes (96 bits) of OS randomness, base64 URL-safe
/// encoded without padding.
///
/// # Panics
///
/// Panics if the OS random number generator fails; there is no sensible
/// recovery when the system entropy source is unavailable.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");

    format!("{prefix}_{}", BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

/// Check that `id` is `{expected_prefix}_` followed by at least 96 bits of
/// valid URL-safe base64.
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    let Some(random_part) = id
        .strip_prefix(expected_prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= 12,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_prefixed_id() {
        let id = generate_prefixed_id("acct");
        assert!(id.starts_with("acct_"));
        assert!(validate_prefixed_id(&id, "acct"));
        assert!(!validate_prefixed_id(&id, "tok"));

        // Two draws never collide in practice
        assert_ne!(id, generate_prefixed_id("acct"));
    }

    #[test]
    fn test_validate_rejects_malformed_ids() {
        assert!(!validate_prefixed_id("acct", "acct"));
        assert!(!validate_prefixed_id("acct_", "acct"));
        assert!(!validate_prefixed_id("acct_!!!", "acct"));
        // Valid base64 but too short for 96 bits
        assert!(!validate_prefixed_id("acct_dGVzdA", "acct"));
    }

    #[test]
    fn test_id_is_url_safe() {
        let id = generate_prefixed_id("tok");
        assert!(
            id.chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        );
    }
}
