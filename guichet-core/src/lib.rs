//! Core functionality for the guichet authentication service
//!
//! This crate contains the account and token domain types, the credential
//! hasher, the token codec, the repository traits that storage backends
//! implement, and the orchestrator services that tie them together.
//!
//! It has no storage or HTTP dependencies of its own: backends plug in
//! through the traits in [`repositories`], and out-of-band delivery plugs in
//! through [`services::Notifier`].

pub mod account;
pub mod crypto;
pub mod error;
pub mod id;
pub mod password;
pub mod repositories;
pub mod services;
pub mod token;
pub mod validation;

pub use account::{Account, AccountId, AccountPatch, NewAccount, Role};
pub use error::{AuthError, Error, StorageError, ValidationError};
pub use password::CredentialHasher;
pub use token::{IssuedToken, TokenId, TokenPurpose};
