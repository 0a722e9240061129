//! # Account Repository
//!
//! Credentials for the local auth provider. Password hashing happens in
//! the app; this table only stores the PHC string.
//!
//! ## Reset Tokens
//! ```text
//! create_reset(token, uid, expires_at)
//!      │
//!      ▼
//! consume_reset(token, now)
//!      ├── unknown token          → None
//!      ├── expired or used        → None
//!      └── valid                  → Some(uid), token marked used
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Password accounts use this provider name.
pub const PASSWORD_PROVIDER: &str = "password";

/// A row of the `accounts` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub uid: String,
    pub email: String,
    /// `None` for federated accounts.
    pub password_hash: Option<String>,
    pub provider: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct ResetRow {
    uid: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account. Emails are unique case-insensitively.
    pub async fn insert(&self, account: &Account) -> DbResult<()> {
        debug!(uid = %account.uid, provider = %account.provider, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                uid, email, password_hash, provider,
                display_name, photo_url, created_at, last_login_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&account.uid)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.provider)
        .bind(&account.display_name)
        .bind(&account.photo_url)
        .bind(account.created_at)
        .bind(account.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &account.email),
            other => other,
        })?;

        Ok(())
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT uid, email, password_hash, provider,
                   display_name, photo_url, created_at, last_login_at
            FROM accounts
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn get_by_uid(&self, uid: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT uid, email, password_hash, provider,
                   display_name, photo_url, created_at, last_login_at
            FROM accounts
            WHERE uid = ?1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn update_display_name(&self, uid: &str, display_name: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE accounts SET display_name = ?2 WHERE uid = ?1")
            .bind(uid)
            .bind(display_name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", uid));
        }
        Ok(())
    }

    pub async fn touch_last_login(&self, uid: &str, now: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE accounts SET last_login_at = ?2 WHERE uid = ?1")
            .bind(uid)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_password_hash(&self, uid: &str, hash: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE accounts SET password_hash = ?2 WHERE uid = ?1")
            .bind(uid)
            .bind(hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", uid));
        }
        Ok(())
    }

    /// Records a single-use reset token.
    pub async fn create_reset(
        &self,
        token: &str,
        uid: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query("INSERT INTO password_resets (token, uid, expires_at) VALUES (?1, ?2, ?3)")
            .bind(token)
            .bind(uid)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        debug!(uid = %uid, "Password reset token issued");
        Ok(())
    }

    /// Marks a reset token used and returns its uid, if it is still valid.
    pub async fn consume_reset(&self, token: &str, now: DateTime<Utc>) -> DbResult<Option<String>> {
        let row = sqlx::query_as::<_, ResetRow>(
            "SELECT uid, expires_at, used_at FROM password_resets WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        if row.used_at.is_some() || row.expires_at <= now {
            debug!(uid = %row.uid, "Rejected stale reset token");
            return Ok(None);
        }

        // Guarded on used_at so two concurrent consumers can't both win
        let result = sqlx::query(
            "UPDATE password_resets SET used_at = ?2 WHERE token = ?1 AND used_at IS NULL",
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(row.uid))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
