//! Analytics repository: dashboard aggregates.
//!
//! Everything here is computed from live data, including the 7-day revenue
//! series (one row per calendar day, zero-filled for quiet days).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use puffshop_core::{OrderStatus, UserRole};

use super::RepositoryError;
use crate::models::{Analytics, DailySales, StatusCount, TopProduct};

/// Best-seller rows on the dashboard.
const TOP_PRODUCT_LIMIT: i64 = 10;

/// Repository for dashboard analytics.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct TopProductRow {
    name: String,
    sales: i32,
}

#[derive(sqlx::FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct DailySalesRow {
    date: NaiveDate,
    sales: Decimal,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Compute the dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` for an unknown stored status.
    pub async fn summary(&self) -> Result<Analytics, RepositoryError> {
        let total_sales: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(total), 0) FROM orders")
                .fetch_one(self.pool)
                .await?;

        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let total_customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
                .bind(UserRole::Customer.as_str())
                .fetch_one(self.pool)
                .await?;

        let today_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE created_at >= date_trunc('day', now())",
        )
        .fetch_one(self.pool)
        .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE stock <= low_stock_threshold",
        )
        .fetch_one(self.pool)
        .await?;

        let top_rows: Vec<TopProductRow> = sqlx::query_as(
            "SELECT name, sales FROM products ORDER BY sales DESC, name ASC LIMIT $1",
        )
        .bind(TOP_PRODUCT_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let status_rows: Vec<StatusCountRow> =
            sqlx::query_as("SELECT status, COUNT(*) AS count FROM orders GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        let daily_rows: Vec<DailySalesRow> = sqlx::query_as(
            "SELECT day::date AS date, COALESCE(SUM(o.total), 0) AS sales
             FROM generate_series(
                 date_trunc('day', now()) - interval '6 days',
                 date_trunc('day', now()),
                 interval '1 day'
             ) AS day
             LEFT JOIN orders o
               ON o.created_at >= day AND o.created_at < day + interval '1 day'
             GROUP BY day
             ORDER BY day ASC",
        )
        .fetch_all(self.pool)
        .await?;

        let order_status_data = status_rows
            .into_iter()
            .map(|row| {
                let status: OrderStatus = row.status.parse().map_err(|e| {
                    RepositoryError::DataCorruption(format!("order status: {e}"))
                })?;
                Ok(StatusCount {
                    status,
                    count: row.count,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Analytics {
            total_sales,
            total_orders,
            total_customers,
            today_orders,
            low_stock_products,
            sales_data: daily_rows
                .into_iter()
                .map(|row| DailySales {
                    date: row.date,
                    sales: row.sales,
                })
                .collect(),
            top_products: top_rows
                .into_iter()
                .map(|row| TopProduct {
                    name: row.name,
                    sales: row.sales,
                })
                .collect(),
            order_status_data,
        })
    }
}
