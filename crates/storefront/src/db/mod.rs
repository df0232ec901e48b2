//! Database operations for the storefront.
//!
//! The storefront and admin share one `PostgreSQL` database; this side is
//! read-mostly (catalog) plus the order-creation transaction. Queries use
//! sqlx's runtime API with `FromRow` structs; migrations live in
//! `migrations/` at the workspace root and run via the CLI:
//!
//! ```bash
//! cargo run -p puffshop-cli -- migrate
//! ```

pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed domain validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced row does not exist (or is not available for sale).
    #[error("not found: {0}")]
    NotFound(String),

    /// An order asked for more units than the catalog can supply.
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },
}

/// Clamp a stored stock count to the domain's unsigned range.
///
/// The schema enforces non-negative stock; a negative value here would mean
/// manual tampering, and degrading to 0 keeps the product visible but
/// unsellable rather than failing the whole listing.
pub(crate) fn clamp_stock(stock: i32) -> u32 {
    u32::try_from(stock).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_stock_passes_non_negative() {
        assert_eq!(clamp_stock(0), 0);
        assert_eq!(clamp_stock(75), 75);
    }

    #[test]
    fn test_clamp_stock_floors_negative() {
        assert_eq!(clamp_stock(-3), 0);
    }
}
