//! Single-use token domain types
//!
//! A token is created when a verification or reset flow is initiated, and is
//! either consumed exactly once or expires and becomes permanently
//! ignorable. The store keeps only the digest; the raw value exists in
//! memory just long enough to hand to the notifier.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    crypto::{RAW_TOKEN_BYTES, digest_token, generate_raw_token},
    error::{Error, ValidationError},
    id::generate_prefixed_id,
};

/// Opaque identifier for a token record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: &str) -> Self {
        TokenId(id.to_string())
    }

    pub fn new_random() -> Self {
        TokenId(generate_prefixed_id("tok"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a token proves once consumed. A token is only ever valid for the
/// purpose it was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    VerifyEmail,
    ResetPassword,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::VerifyEmail => "verify_email",
            TokenPurpose::ResetPassword => "reset_password",
        }
    }
}

impl FromStr for TokenPurpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verify_email" => Ok(TokenPurpose::VerifyEmail),
            "reset_password" => Ok(TokenPurpose::ResetPassword),
            other => {
                Err(ValidationError::InvalidField(format!("Unknown token purpose: {other}")).into())
            }
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly generated token: the raw secret plus everything the store
/// persists about it.
///
/// `raw` is never written to storage or logs. `expires_at` is always in the
/// future at creation.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id: TokenId,
    pub account_id: AccountId,
    pub purpose: TokenPurpose,
    pub raw: String,
    pub digest: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Generate a new token for `account_id` valid for `ttl` from now.
    pub fn generate(account_id: AccountId, purpose: TokenPurpose, ttl: Duration) -> Self {
        let raw = generate_raw_token(RAW_TOKEN_BYTES);
        let digest = digest_token(&raw);
        let created_at = Utc::now();

        Self {
            id: TokenId::new_random(),
            account_id,
            purpose,
            raw,
            digest,
            created_at,
            expires_at: created_at + ttl,
        }
    }
}
