//! Admin user repository.

use sqlx::PgPool;

use puffshop_core::{Email, UserId, UserRole};

use super::{RepositoryError, is_unique_violation};
use crate::models::CurrentAdmin;

/// Repository for admin accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: UserId,
    email: String,
    name: String,
    password_hash: Option<String>,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an active admin with their password hash, by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(CurrentAdmin, Option<String>)>, RepositoryError> {
        let row: Option<AdminUserRow> = sqlx::query_as(
            "SELECT id, email, name, password_hash
             FROM users WHERE email = $1 AND role = $2 AND is_active",
        )
        .bind(email.as_str())
        .bind(UserRole::Admin.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            let email = Email::parse(&row.email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
            Ok((
                CurrentAdmin {
                    id: row.id,
                    email,
                    name: row.name,
                },
                row.password_hash,
            ))
        })
        .transpose()
    }

    /// Create an admin account with a pre-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the email is taken and
    /// `RepositoryError::Database` on other query failures.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<CurrentAdmin, RepositoryError> {
        let id = UserId::new();
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .bind(UserRole::Admin.as_str())
        .execute(self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("An account with this email already exists".to_string())
            } else {
                RepositoryError::Database(err)
            }
        })?;

        Ok(CurrentAdmin {
            id,
            email: email.clone(),
            name: name.to_string(),
        })
    }
}
