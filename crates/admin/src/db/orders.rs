//! Order repository: back-office order management.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use puffshop_core::{OrderId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{AdminOrder, AdminOrderItem};

/// Repository for order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    shipping_address: String,
    notes: Option<String>,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: Uuid,
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    variant_name: Option<String>,
    variant_value: Option<String>,
}

const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, \
     customer_phone, shipping_address, notes, total, status, created_at";

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders, newest first, with their items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn list(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Fetch one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn get(&self, id: OrderId) -> Result<Option<AdminOrder>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut orders = self.assemble(vec![row]).await?;
        Ok(orders.pop())
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id and
    /// `RepositoryError::Database` on query failure.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<AdminOrder, RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET status = $1, updated_at = now() WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("order {id}")));
        }

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("updated order {id} not readable"))
        })
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<AdminOrder>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id.as_uuid()).collect();

        let item_rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT oi.order_id, oi.product_id, p.name AS product_name,
                    oi.quantity, oi.unit_price, oi.variant_name, oi.variant_value
             FROM order_items oi
             JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = ANY($1)
             ORDER BY p.name ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<AdminOrderItem>> = HashMap::new();
        for item in item_rows {
            let variant_label = match (&item.variant_name, &item.variant_value) {
                (Some(name), Some(value)) => Some(format!("{name}: {value}")),
                _ => None,
            };
            items.entry(item.order_id).or_default().push(AdminOrderItem {
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                variant_label,
            });
        }

        rows.into_iter()
            .map(|row| {
                let status: OrderStatus = row.status.parse().map_err(|e| {
                    RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
                })?;
                let key = row.id.as_uuid();
                Ok(AdminOrder {
                    id: row.id,
                    order_number: row.order_number,
                    customer_name: row.customer_name,
                    customer_email: row.customer_email,
                    customer_phone: row.customer_phone,
                    shipping_address: row.shipping_address,
                    notes: row.notes,
                    total: row.total,
                    status,
                    created_at: row.created_at,
                    items: items.remove(&key).unwrap_or_default(),
                })
            })
            .collect()
    }
}
