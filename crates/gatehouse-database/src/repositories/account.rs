//! Account repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::account::{Account, CreateAccount};

/// Repository for account rows.
///
/// The credential store owns these rows exclusively; nothing else writes
/// the `accounts` table.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by id", e)
            })
    }

    /// Find an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by email", e)
            })
    }

    /// Find an account by email inside an open transaction.
    pub async fn find_by_email_tx(
        &self,
        conn: &mut PgConnection,
        email: &str,
    ) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by email", e)
            })
    }

    /// Find an account by identity-provider subject id inside an open
    /// transaction.
    pub async fn find_by_federated_id_tx(
        &self,
        conn: &mut PgConnection,
        federated_id: &str,
    ) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE federated_id = $1")
            .bind(federated_id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find account by federated id",
                    e,
                )
            })
    }

    /// Insert a new account inside an open transaction.
    ///
    /// A duplicate email surfaces as a `Conflict` error via the unique
    /// index on `LOWER(email)`.
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        data: &CreateAccount,
    ) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (email, password_hash, email_verified, federated_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.email_verified)
        .bind(&data.federated_id)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("accounts_email_key") =>
            {
                AppError::conflict("An account with this email already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create account", e),
        })
    }

    /// Count all accounts inside an open transaction.
    ///
    /// Used to detect the first-ever registration for the admin grant.
    pub async fn count_tx(&self, conn: &mut PgConnection) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count accounts", e))
    }

    /// Stamp `last_login` inside an open transaction.
    pub async fn touch_last_login_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET last_login = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    /// Mark an account's email as verified.
    pub async fn set_email_verified(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to mark email verified", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    /// Mark an account's email as verified inside an open transaction,
    /// returning the updated row.
    pub async fn set_email_verified_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET email_verified = TRUE, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark email verified", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    /// Link an identity-provider subject onto an existing account and
    /// force the email verified, inside an open transaction.
    pub async fn link_federated_id_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        federated_id: &str,
    ) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET federated_id = $2, email_verified = TRUE, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(federated_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to link federated id", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    /// Replace an account's password hash inside an open transaction.
    pub async fn update_password_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(conn)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    /// List accounts, newest first, for the administrative interface.
    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list accounts", e))
    }
}
