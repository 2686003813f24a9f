use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guichet_core::{
    Account, AccountId, AccountPatch, Error, NewAccount,
    error::StorageError,
    repositories::AccountRepository,
};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SqliteAccount {
    id: String,
    email: String,
    #[allow(dead_code)]
    credential_hash: String,
    role: String,
    display_name: Option<String>,
    email_verified_at: Option<i64>,
    deleted_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteAccount> for Account {
    type Error = Error;

    fn try_from(row: SqliteAccount) -> Result<Self, Error> {
        // a role string outside the known set is data corruption, not a
        // default
        let role = row.role.parse().map_err(|_| {
            Error::Storage(StorageError::Database(format!(
                "unknown role '{}' stored on account {}",
                row.role, row.id
            )))
        })?;

        Ok(Account {
            id: AccountId::from(row.id.as_str()),
            email: row.email,
            role,
            display_name: row.display_name,
            email_verified_at: row
                .email_verified_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            deleted_at: row.deleted_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
        })
    }
}

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error, conflicting: &str) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return Error::Storage(StorageError::Duplicate(conflicting.to_string()));
        }
    }
    Error::Storage(StorageError::Database(e.to_string()))
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, draft: NewAccount) -> Result<Account, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteAccount>(
            r#"
            INSERT INTO accounts (id, email, credential_hash, role, display_name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(draft.id.as_str())
        .bind(&draft.email)
        .bind(&draft.credential_hash)
        .bind(draft.role.as_str())
        .bind(&draft.display_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &draft.email))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>(
            "SELECT * FROM accounts WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>(
            "SELECT * FROM accounts WHERE email = ?1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        row.map(Account::try_from).transpose()
    }

    async fn list(&self, limit: i64) -> Result<Vec<Account>, Error> {
        let rows = sqlx::query_as::<_, SqliteAccount>(
            r#"
            SELECT * FROM accounts
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn apply_patch(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, Error> {
        let now = Utc::now().timestamp();

        // COALESCE keeps absent fields; the empty-string sentinel clears
        // display_name to NULL.
        let row = sqlx::query_as::<_, SqliteAccount>(
            r#"
            UPDATE accounts
            SET display_name = CASE
                    WHEN ?2 IS NULL THEN display_name
                    WHEN ?2 = '' THEN NULL
                    ELSE ?2
                END,
                role = COALESCE(?3, role),
                updated_at = ?4
            WHERE id = ?1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id.as_str())
        .bind(&patch.display_name)
        .bind(patch.role.map(|r| r.as_str()))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        row.map(Account::try_from).transpose()
    }

    async fn mark_email_verified(&self, id: &AccountId) -> Result<(), Error> {
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            UPDATE accounts SET email_verified_at = ?1, updated_at = ?1
            WHERE id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(())
    }

    async fn update_credential(&self, id: &AccountId, new_hash: &str) -> Result<(), Error> {
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            UPDATE accounts SET credential_hash = ?1, updated_at = ?2
            WHERE id = ?3 AND deleted_at IS NULL
            "#,
        )
        .bind(new_hash)
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(())
    }

    async fn credential_hash(&self, id: &AccountId) -> Result<Option<String>, Error> {
        let hash: Option<(String,)> = sqlx::query_as(
            "SELECT credential_hash FROM accounts WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(hash.map(|(h,)| h))
    }

    async fn soft_delete(&self, id: &AccountId) -> Result<bool, Error> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE accounts SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(result.rows_affected() > 0)
    }
}
