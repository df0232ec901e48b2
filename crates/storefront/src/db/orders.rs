//! Order repository: the order service's persistence.
//!
//! Order creation is the revalidation boundary the cart defers to: the
//! client snapshot is checked against the live catalog, every amount is
//! recomputed server-side, and stock moves in the same transaction.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use puffshop_core::cart::SelectedVariant;
use puffshop_core::{OrderId, OrderStatus, ProductId, VariantId};

use super::{RepositoryError, clamp_stock};
use crate::models::{Order, OrderDraft, OrderDraftItem, OrderItem};

/// Order number alphabet: no 0/O/1/I lookalikes, these end up on invoices.
const ORDER_NUMBER_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
const ORDER_NUMBER_SUFFIX_LEN: usize = 8;

/// Repository for order persistence.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct SaleProductRow {
    name: String,
    price: Decimal,
    stock: i32,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct SaleVariantRow {
    id: Uuid,
    price: Option<Decimal>,
    stock: i32,
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
struct OrderItemRow {
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    variant_name: Option<String>,
    variant_value: Option<String>,
    variant_price_delta: Option<Decimal>,
}

/// A draft line after catalog revalidation.
struct ResolvedLine {
    product_id: ProductId,
    product_name: String,
    quantity: u32,
    unit_price: Decimal,
    variant: Option<SelectedVariant>,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from a checkout submission.
    ///
    /// One transaction: each line is revalidated against the catalog (rows
    /// locked `FOR UPDATE`), the total is recomputed from live prices,
    /// product and variant stock decrement, `sales` increments, and a stock
    /// log row records the movement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown or inactive products
    /// and variants, `RepositoryError::InsufficientStock` when a line asks
    /// for more than is available, and `RepositoryError::Database` on query
    /// failure. Any error rolls the whole order back.
    pub async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = OrderId::new();
        let order_number = generate_order_number();

        let mut lines = Vec::with_capacity(draft.items.len());
        let mut total = Decimal::ZERO;
        for item in &draft.items {
            let line = resolve_line(&mut tx, item, &order_number).await?;
            total += line.unit_price * Decimal::from(line.quantity);
            lines.push(line);
        }

        // Link the order to an existing account for this email, if any.
        let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&draft.customer_email)
            .fetch_optional(&mut *tx)
            .await?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO orders
                 (id, order_number, user_id, customer_name, customer_email,
                  customer_phone, shipping_address, notes, total, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING created_at",
        )
        .bind(order_id)
        .bind(&order_number)
        .bind(user_id)
        .bind(&draft.customer_name)
        .bind(&draft.customer_email)
        .bind(&draft.customer_phone)
        .bind(&draft.shipping_address)
        .bind(&draft.notes)
        .bind(total)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, quantity, unit_price,
                      variant_name, variant_value, variant_price_delta)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(to_db_count(line.quantity))
            .bind(line.unit_price)
            .bind(line.variant.as_ref().map(|v| v.variant_name.clone()))
            .bind(line.variant.as_ref().map(|v| v.variant_value.clone()))
            .bind(line.variant.as_ref().and_then(|v| v.price_delta))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            order_number,
            customer_name: draft.customer_name.clone(),
            customer_email: draft.customer_email.clone(),
            customer_phone: draft.customer_phone.clone(),
            shipping_address: draft.shipping_address.clone(),
            notes: draft.notes.clone(),
            total,
            status: OrderStatus::Pending,
            created_at,
            items: lines
                .into_iter()
                .map(|line| OrderItem {
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    selected_variant: line.variant,
                })
                .collect(),
        })
    }

    /// Fetch one order with its items (for the confirmation view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, order_number, customer_name, customer_email, customer_phone,
                    shipping_address, notes, total, status, created_at
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT oi.product_id, p.name AS product_name, oi.quantity, oi.unit_price,
                    oi.variant_name, oi.variant_value, oi.variant_price_delta
             FROM order_items oi
             JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = $1
             ORDER BY p.name ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;

        Ok(Some(Order {
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
            items: item_rows.into_iter().map(order_item_from_row).collect(),
        }))
    }
}

/// Revalidate one draft line against the catalog and move its stock.
async fn resolve_line(
    tx: &mut Transaction<'_, Postgres>,
    item: &OrderDraftItem,
    order_number: &str,
) -> Result<ResolvedLine, RepositoryError> {
    let product: Option<SaleProductRow> = sqlx::query_as(
        "SELECT name, price, stock, is_active FROM products WHERE id = $1 FOR UPDATE",
    )
    .bind(item.product_id)
    .fetch_optional(&mut **tx)
    .await?;

    let Some(product) = product else {
        return Err(RepositoryError::NotFound(format!(
            "product {}",
            item.product_id
        )));
    };
    if !product.is_active {
        return Err(RepositoryError::NotFound(format!(
            "product {} is no longer available",
            item.product_id
        )));
    }

    let product_stock = clamp_stock(product.stock);
    if item.quantity > product_stock {
        return Err(RepositoryError::InsufficientStock {
            name: product.name,
            requested: item.quantity,
            available: product_stock,
        });
    }

    let mut unit_price = product.price;
    let mut resolved_variant = None;

    if let Some(sel) = &item.selected_variant {
        let variant: Option<SaleVariantRow> = if let Some(variant_id) = sel.variant_id {
            sqlx::query_as(
                "SELECT id, price, stock FROM product_variants
                 WHERE id = $1 AND product_id = $2 AND is_active FOR UPDATE",
            )
            .bind(variant_id)
            .bind(item.product_id)
            .fetch_optional(&mut **tx)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, price, stock FROM product_variants
                 WHERE product_id = $1 AND name = $2 AND value = $3 AND is_active FOR UPDATE",
            )
            .bind(item.product_id)
            .bind(&sel.variant_name)
            .bind(&sel.variant_value)
            .fetch_optional(&mut **tx)
            .await?
        };

        let Some(variant) = variant else {
            return Err(RepositoryError::NotFound(format!(
                "variant {}={} of product {}",
                sel.variant_name, sel.variant_value, item.product_id
            )));
        };

        let variant_stock = clamp_stock(variant.stock);
        if item.quantity > variant_stock {
            return Err(RepositoryError::InsufficientStock {
                name: format!("{} ({})", product.name, sel.variant_value),
                requested: item.quantity,
                available: variant_stock,
            });
        }

        unit_price = variant.price.unwrap_or(product.price);
        resolved_variant = Some(SelectedVariant {
            variant_id: Some(VariantId::from_uuid(variant.id)),
            variant_name: sel.variant_name.clone(),
            variant_value: sel.variant_value.clone(),
            price_delta: variant.price.map(|price| price - product.price),
        });

        sqlx::query("UPDATE product_variants SET stock = stock - $1 WHERE id = $2")
            .bind(to_db_count(item.quantity))
            .bind(variant.id)
            .execute(&mut **tx)
            .await?;
    }

    // Product stock is the aggregate across variants, so it always moves.
    let new_stock = product_stock - item.quantity;
    sqlx::query(
        "UPDATE products SET stock = $1, sales = sales + $2, updated_at = now() WHERE id = $3",
    )
    .bind(to_db_count(new_stock))
    .bind(to_db_count(item.quantity))
    .bind(item.product_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query("INSERT INTO stock_logs (product_id, old_stock, new_stock, reason) VALUES ($1, $2, $3, $4)")
        .bind(item.product_id)
        .bind(to_db_count(product_stock))
        .bind(to_db_count(new_stock))
        .bind(format!("Order {order_number}"))
        .execute(&mut **tx)
        .await?;

    Ok(ResolvedLine {
        product_id: item.product_id,
        product_name: product.name,
        quantity: item.quantity,
        unit_price,
        variant: resolved_variant,
    })
}

fn order_item_from_row(row: OrderItemRow) -> OrderItem {
    let selected_variant = match (row.variant_name, row.variant_value) {
        (Some(name), Some(value)) => Some(SelectedVariant {
            variant_id: None,
            variant_name: name,
            variant_value: value,
            price_delta: row.variant_price_delta,
        }),
        _ => None,
    };

    OrderItem {
        product_id: row.product_id,
        product_name: row.product_name,
        quantity: clamp_stock(row.quantity),
        unit_price: row.unit_price,
        selected_variant,
    }
}

/// Generate a human-facing order number, e.g. `PS-7XKQM2WN`.
fn generate_order_number() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .map(|_| {
            ORDER_NUMBER_ALPHABET
                .choose(&mut rng)
                .copied()
                .unwrap_or(b'X') as char
        })
        .collect();
    format!("PS-{suffix}")
}

fn to_db_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
