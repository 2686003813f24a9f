//! Token codec: raw token generation and lookup digests
//!
//! A raw token is the only secret: 256 bits of OS randomness, URL-safe
//! encoded, handed to the user in a link and never persisted. What the store
//! keeps is a deterministic SHA-256 digest of the raw value, used purely as
//! a lookup key. The digest is not a secrecy mechanism in itself — the
//! entropy lives in the raw token — but it means a database read or leak
//! never yields a usable token.
//!
//! SHA-256 (rather than a memory-hard hash) is sufficient here because the
//! input is high-entropy random data, not a human-chosen password.
//! Comparisons go through `subtle` so they take constant time.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Default raw token length in bytes (256 bits of entropy).
pub const RAW_TOKEN_BYTES: usize = 32;

/// Generate a cryptographically random raw token.
///
/// Returns a URL-safe base64 string of `byte_length` random bytes. Callers
/// should not go below [`RAW_TOKEN_BYTES`].
///
/// # Panics
///
/// Panics if the OS random number generator fails; security-sensitive token
/// issuance cannot proceed without system entropy.
pub fn generate_raw_token(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

/// Compute the hex-encoded SHA-256 digest of a raw token.
///
/// Deterministic, so it can serve as a unique lookup key in the token store.
pub fn digest_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a raw token against a stored digest in constant time.
pub fn verify_digest(raw: &str, stored_digest: &str) -> bool {
    let computed = digest_token(raw);
    constant_time_compare(computed.as_bytes(), stored_digest.as_bytes())
}

/// Constant-time equality on byte slices via the `subtle` crate.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
