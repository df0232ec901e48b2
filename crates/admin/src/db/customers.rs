//! Customer repository: storefront accounts with order history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use puffshop_core::{OrderId, OrderStatus, ProductId, UserId, UserRole};

use super::RepositoryError;
use crate::models::{AdminOrderItem, Customer, CustomerOrder};

/// Repository for customer management.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: UserId,
    email: String,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Uuid,
    order_number: String,
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

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all customers, newest first, each with their order history
    /// (summaries only; items are loaded on the detail view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            "SELECT id, email, name, is_active, created_at
             FROM users WHERE role = $1
             ORDER BY created_at DESC",
        )
        .bind(UserRole::Customer.as_str())
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id.as_uuid()).collect();
        let order_rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, order_number, total, status, created_at
             FROM orders WHERE user_id = ANY($1)
             ORDER BY created_at DESC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut orders: HashMap<Uuid, Vec<CustomerOrder>> = HashMap::new();
        for row in order_rows {
            let user_key = row.user_id;
            let order = customer_order(row, Vec::new())?;
            orders.entry(user_key).or_default().push(order);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let key = row.id.as_uuid();
                Customer {
                    id: row.id,
                    email: row.email,
                    name: row.name,
                    is_active: row.is_active,
                    created_at: row.created_at,
                    orders: orders.remove(&key).unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Fetch one customer with full order history, items included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn get(&self, id: UserId) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT id, email, name, is_active, created_at
             FROM users WHERE id = $1 AND role = $2",
        )
        .bind(id)
        .bind(UserRole::Customer.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, order_number, total, status, created_at
             FROM orders WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let order_ids: Vec<Uuid> = order_rows.iter().map(|o| o.id.as_uuid()).collect();
        let item_rows: Vec<ItemRow> = if order_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as(
                "SELECT oi.order_id, oi.product_id, p.name AS product_name,
                        oi.quantity, oi.unit_price, oi.variant_name, oi.variant_value
                 FROM order_items oi
                 JOIN products p ON p.id = oi.product_id
                 WHERE oi.order_id = ANY($1)
                 ORDER BY p.name ASC",
            )
            .bind(&order_ids)
            .fetch_all(self.pool)
            .await?
        };

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

        let orders = order_rows
            .into_iter()
            .map(|order| {
                let order_items = items.remove(&order.id.as_uuid()).unwrap_or_default();
                customer_order(order, order_items)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Customer {
            id: row.id,
            email: row.email,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
            orders,
        }))
    }

    /// Enable or disable a customer account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id and
    /// `RepositoryError::Database` on query failure.
    pub async fn set_active(
        &self,
        id: UserId,
        is_active: bool,
    ) -> Result<Customer, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $1, updated_at = now()
             WHERE id = $2 AND role = $3",
        )
        .bind(is_active)
        .bind(id)
        .bind(UserRole::Customer.as_str())
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("customer {id}")));
        }

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("updated customer {id} not readable"))
        })
    }
}

fn customer_order(
    row: OrderRow,
    items: Vec<AdminOrderItem>,
) -> Result<CustomerOrder, RepositoryError> {
    let status: OrderStatus = row
        .status
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;
    Ok(CustomerOrder {
        id: row.id,
        order_number: row.order_number,
        total: row.total,
        status,
        created_at: row.created_at,
        items,
    })
}
