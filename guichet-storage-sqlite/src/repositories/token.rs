use async_trait::async_trait;
use chrono::{Duration, Utc};
use guichet_core::{
    AccountId, Error, TokenPurpose,
    crypto::digest_token,
    error::StorageError,
    repositories::TokenRepository,
    token::IssuedToken,
};
use sqlx::SqlitePool;

pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn issue(
        &self,
        account_id: &AccountId,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<IssuedToken, Error> {
        let token = IssuedToken::generate(account_id.clone(), purpose, ttl);

        sqlx::query(
            r#"
            INSERT INTO tokens (id, account_id, purpose, token_digest, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(token.id.as_str())
        .bind(token.account_id.as_str())
        .bind(token.purpose.as_str())
        .bind(&token.digest)
        .bind(token.created_at.timestamp())
        .bind(token.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return Error::Storage(StorageError::Duplicate(token.digest.clone()));
                }
            }
            Error::Storage(StorageError::Database(e.to_string()))
        })?;

        Ok(token)
    }

    async fn consume(
        &self,
        raw_token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<AccountId>, Error> {
        let digest = digest_token(raw_token);
        let now = Utc::now().timestamp();

        // Single conditional UPDATE: of N racing callers exactly one gets
        // the row back, everyone else sees no match.
        let winner: Option<(String,)> = sqlx::query_as(
            r#"
            UPDATE tokens SET used_at = ?1
            WHERE token_digest = ?2
              AND purpose = ?3
              AND used_at IS NULL
              AND expires_at > ?1
            RETURNING account_id
            "#,
        )
        .bind(now)
        .bind(&digest)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(winner.map(|(account_id,)| AccountId::from(account_id.as_str())))
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let now = Utc::now().timestamp();

        let result =
            sqlx::query("DELETE FROM tokens WHERE used_at IS NOT NULL OR expires_at <= ?1")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "reclaimed token rows");
        }
        Ok(purged)
    }
}
