//! Idempotent schema setup.
//!
//! The partial unique index on `accounts.email` is the invariant that makes
//! soft deletion work: a deleted row keeps its email for audit purposes
//! while freeing it for re-registration.

use guichet_core::{Error, error::StorageError};
use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        credential_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'visiteur',
        display_name TEXT,
        email_verified_at INTEGER,
        deleted_at INTEGER,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_live_email
        ON accounts(email) WHERE deleted_at IS NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(id),
        purpose TEXT NOT NULL,
        token_digest TEXT NOT NULL,
        used_at INTEGER,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_digest
        ON tokens(token_digest)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tokens_account_purpose
        ON tokens(account_id, purpose)
    "#,
];

pub(crate) async fn provision(pool: &SqlitePool) -> Result<(), Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            tracing::error!(error = %e, "schema provisioning failed");
            Error::Storage(StorageError::Database(e.to_string()))
        })?;
    }
    Ok(())
}
