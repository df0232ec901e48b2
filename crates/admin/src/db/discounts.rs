//! Discount repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use puffshop_core::{DiscountId, DiscountKind};

use super::{RepositoryError, is_unique_violation};
use crate::models::{Discount, DiscountInput};

/// Repository for discount management.
pub struct DiscountRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct DiscountRow {
    id: DiscountId,
    code: String,
    name: String,
    description: Option<String>,
    kind: String,
    value: Decimal,
    min_amount: Option<Decimal>,
    max_uses: Option<i32>,
    used_count: i32,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

const DISCOUNT_COLUMNS: &str = "id, code, name, description, kind, value, min_amount, \
     max_uses, used_count, starts_at, ends_at, is_active, created_at";

impl<'a> DiscountRepository<'a> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all discounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` for an unknown stored kind.
    pub async fn list(&self) -> Result<Vec<Discount>, RepositoryError> {
        let rows: Vec<DiscountRow> = sqlx::query_as(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(discount_from_row).collect()
    }

    /// Fetch one discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` for an unknown stored kind.
    pub async fn get(&self, id: DiscountId) -> Result<Option<Discount>, RepositoryError> {
        let row: Option<DiscountRow> = sqlx::query_as(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(discount_from_row).transpose()
    }

    /// Create a discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate code and
    /// `RepositoryError::Database` on other query failures.
    pub async fn create(&self, input: &DiscountInput) -> Result<Discount, RepositoryError> {
        let id = DiscountId::new();
        let row: DiscountRow = sqlx::query_as(&format!(
            "INSERT INTO discounts
                 (id, code, name, description, kind, value, min_amount,
                  max_uses, starts_at, ends_at, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.kind.as_str())
        .bind(input.value)
        .bind(input.min_amount)
        .bind(input.max_uses)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(map_code_conflict)?;

        discount_from_row(row)
    }

    /// Update a discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id,
    /// `RepositoryError::Conflict` for a duplicate code, and
    /// `RepositoryError::Database` on other query failures.
    pub async fn update(
        &self,
        id: DiscountId,
        input: &DiscountInput,
    ) -> Result<Discount, RepositoryError> {
        let row: Option<DiscountRow> = sqlx::query_as(&format!(
            "UPDATE discounts SET
                 code = $1, name = $2, description = $3, kind = $4, value = $5,
                 min_amount = $6, max_uses = $7, starts_at = $8, ends_at = $9,
                 is_active = $10, updated_at = now()
             WHERE id = $11
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.kind.as_str())
        .bind(input.value)
        .bind(input.min_amount)
        .bind(input.max_uses)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_active)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_code_conflict)?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound(format!("discount {id}")));
        };
        discount_from_row(row)
    }

    /// Delete a discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id and
    /// `RepositoryError::Database` on query failure.
    pub async fn delete(&self, id: DiscountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("discount {id}")));
        }
        Ok(())
    }
}

fn map_code_conflict(err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::Conflict("A discount with this code already exists".to_string())
    } else {
        RepositoryError::Database(err)
    }
}

fn discount_from_row(row: DiscountRow) -> Result<Discount, RepositoryError> {
    let kind: DiscountKind = row
        .kind
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("discount {}: {e}", row.id)))?;
    Ok(Discount {
        id: row.id,
        code: row.code,
        name: row.name,
        description: row.description,
        kind,
        value: row.value,
        min_amount: row.min_amount,
        max_uses: row.max_uses,
        used_count: row.used_count,
        starts_at: row.starts_at,
        ends_at: row.ends_at,
        is_active: row.is_active,
        created_at: row.created_at,
    })
}
