//! Account domain types
//!
//! An account moves through two states: `Unverified` (no
//! `email_verified_at`) and `Verified`. Soft deletion (`deleted_at`) is a
//! terminal administrative state; deleted accounts are excluded from every
//! lookup but never removed from storage.
//!
//! | Field               | Type               | Notes                                          |
//! | ------------------- | ------------------ | ---------------------------------------------- |
//! | `id`                | `AccountId`        | Opaque, assigned at creation, immutable.       |
//! | `email`             | `String`           | Trimmed, lowercased; unique among live rows.   |
//! | `role`              | `Role`             | Defaults to the least-privileged value.        |
//! | `display_name`      | `Option<String>`   | Trimmed, bounded, must not look like an email. |
//! | `email_verified_at` | `Option<DateTime>` | `None` means the account cannot authenticate.  |
//! | `deleted_at`        | `Option<DateTime>` | Soft-delete marker.                            |
//!
//! The credential hash is deliberately absent: it never leaves the store
//! layer (see [`crate::repositories::AccountRepository::credential_hash`]).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
};

/// A unique, stable identifier for an account.
///
/// Treat as opaque; the `acct_` prefix exists only for log readability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        AccountId(id.to_string())
    }

    pub fn new_random() -> Self {
        AccountId(generate_prefixed_id("acct"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "acct")
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed role set, carried over from the upstream deployment.
///
/// Roles are stored and serialized by their wire names; enforcement of what
/// a role may do is out of scope here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "MasterOfUnivers")]
    MasterOfUnivers,
    #[serde(rename = "superadmin")]
    Superadmin,
    #[serde(rename = "officier")]
    Officier,
    #[serde(rename = "agent")]
    Agent,
    #[default]
    #[serde(rename = "visiteur")]
    Visiteur,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::MasterOfUnivers => "MasterOfUnivers",
            Role::Superadmin => "superadmin",
            Role::Officier => "officier",
            Role::Agent => "agent",
            Role::Visiteur => "visiteur",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MasterOfUnivers" => Ok(Role::MasterOfUnivers),
            "superadmin" => Ok(Role::Superadmin),
            "officier" => Ok(Role::Officier),
            "agent" => Ok(Role::Agent),
            "visiteur" => Ok(Role::Visiteur),
            other => Err(ValidationError::InvalidField(format!("Unknown role: {other}")).into()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as returned by the stores and services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
    pub display_name: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Draft for account creation. Carries the credential hash because the store
/// needs it at insert time; the hash is dropped from the resulting
/// [`Account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: AccountId,
    pub email: String,
    pub credential_hash: String,
    pub role: Role,
    pub display_name: Option<String>,
}

impl NewAccount {
    pub fn builder() -> NewAccountBuilder {
        NewAccountBuilder::default()
    }
}

#[derive(Default)]
pub struct NewAccountBuilder {
    id: Option<AccountId>,
    email: Option<String>,
    credential_hash: Option<String>,
    role: Option<Role>,
    display_name: Option<String>,
}

impl NewAccountBuilder {
    pub fn id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn credential_hash(mut self, hash: String) -> Self {
        self.credential_hash = Some(hash);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn build(self) -> Result<NewAccount, Error> {
        Ok(NewAccount {
            id: self.id.unwrap_or_default(),
            email: self
                .email
                .ok_or_else(|| ValidationError::MissingField("Email is required".to_string()))?,
            credential_hash: self.credential_hash.ok_or_else(|| {
                ValidationError::MissingField("Credential hash is required".to_string())
            })?,
            role: self.role.unwrap_or_default(),
            display_name: self.display_name,
        })
    }
}

/// Partial update for administrative account edits.
///
/// `None` fields are left untouched; an empty `display_name` clears it.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub display_name: Option<String>,
    pub role: Option<Role>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_prefixed() {
        let id = AccountId::new_random();
        assert!(id.as_str().starts_with("acct_"));
        assert!(id.is_valid());
        assert_ne!(id, AccountId::new_random());

        assert!(!AccountId::new("whatever").is_valid());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::MasterOfUnivers,
            Role::Superadmin,
            Role::Officier,
            Role::Agent,
            Role::Visiteur,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Visiteur);
    }

    #[test]
    fn test_new_account_requires_email_and_hash() {
        let err = NewAccount::builder().build();
        assert!(err.is_err());

        let account = NewAccount::builder()
            .email("a@x.com".to_string())
            .credential_hash("$argon2id$...".to_string())
            .build()
            .unwrap();
        assert_eq!(account.role, Role::Visiteur);
        assert!(account.display_name.is_none());
        assert!(account.id.is_valid());
    }
}
