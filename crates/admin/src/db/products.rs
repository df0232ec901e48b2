//! Catalog repository: full product management.
//!
//! Writes follow the admin UI's editing model: gallery and variants are
//! replaced wholesale on update, and every stock movement leaves a log row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use puffshop_core::{ImageId, ProductId, StockLogId, VariantId};

use super::RepositoryError;
use crate::models::{
    AdminProduct, AdminProductImage, AdminProductVariant, ImageInput, ProductInput, StockLog,
    VariantInput,
};

/// Stock log rows attached per product on list views.
const LIST_STOCK_LOGS: i64 = 5;
/// Stock log rows attached on the detail view.
const DETAIL_STOCK_LOGS: i64 = 10;

/// Repository for catalog management.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    stock: i32,
    low_stock_threshold: i32,
    featured: bool,
    is_active: bool,
    views: i32,
    sales: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: ImageId,
    product_id: Uuid,
    url: String,
    alt: String,
    is_primary: bool,
    position: i32,
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: VariantId,
    product_id: Uuid,
    name: String,
    value: String,
    price: Option<Decimal>,
    stock: i32,
    sku: Option<String>,
    is_active: bool,
    position: i32,
}

#[derive(sqlx::FromRow)]
struct StockLogRow {
    id: StockLogId,
    product_id: Uuid,
    old_stock: i32,
    new_stock: i32,
    reason: String,
    created_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, stock, \
     low_stock_threshold, featured, is_active, views, sales, created_at, updated_at";

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products (including inactive), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<AdminProduct>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows, LIST_STOCK_LOGS).await
    }

    /// Products at or below their low-stock threshold, most depleted first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn low_stock(&self) -> Result<Vec<AdminProduct>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE stock <= low_stock_threshold
             ORDER BY stock ASC, name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows, LIST_STOCK_LOGS).await
    }

    /// Fetch one product with gallery, variants, and recent stock logs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<AdminProduct>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut products = self.assemble(vec![row], DETAIL_STOCK_LOGS).await?;
        Ok(products.pop())
    }

    /// Create a product with its gallery and variants in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, input: &ProductInput) -> Result<AdminProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = ProductId::new();

        sqlx::query(
            "INSERT INTO products
                 (id, name, description, price, category, stock,
                  low_stock_threshold, featured, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.category)
        .bind(input.stock)
        .bind(input.low_stock_threshold)
        .bind(input.featured)
        .bind(input.is_active)
        .execute(&mut *tx)
        .await?;

        insert_gallery(&mut tx, id, &input.gallery).await?;
        insert_variants(&mut tx, id, &input.variants).await?;

        tx.commit().await?;

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("created product {id} not readable"))
        })
    }

    /// Update a product; gallery and variants are replaced wholesale, and a
    /// changed stock value is logged as "Admin update".
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id and
    /// `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<AdminProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let old_stock: Option<i32> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(old_stock) = old_stock else {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        };

        sqlx::query(
            "UPDATE products SET
                 name = $1, description = $2, price = $3, category = $4,
                 stock = $5, low_stock_threshold = $6, featured = $7,
                 is_active = $8, updated_at = now()
             WHERE id = $9",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.category)
        .bind(input.stock)
        .bind(input.low_stock_threshold)
        .bind(input.featured)
        .bind(input.is_active)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if old_stock != input.stock {
            insert_stock_log(&mut tx, id, old_stock, input.stock, "Admin update").await?;
        }

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_gallery(&mut tx, id, &input.gallery).await?;

        sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_variants(&mut tx, id, &input.variants).await?;

        tx.commit().await?;

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("updated product {id} not readable"))
        })
    }

    /// Adjust stock only, logging the movement as a manual adjustment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id and
    /// `RepositoryError::Database` if a query fails.
    pub async fn update_stock(
        &self,
        id: ProductId,
        stock: i32,
    ) -> Result<AdminProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let old_stock: Option<i32> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(old_stock) = old_stock else {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        };

        sqlx::query("UPDATE products SET stock = $1, updated_at = now() WHERE id = $2")
            .bind(stock)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_stock_log(&mut tx, id, old_stock, stock, "Manual stock adjustment").await?;

        tx.commit().await?;

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("updated product {id} not readable"))
        })
    }

    /// Delete a product, refusing while order history references it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when order items reference the
    /// product, `RepositoryError::NotFound` for an unknown id, and
    /// `RepositoryError::Database` if a query fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let referenced: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM order_items WHERE product_id = $1 LIMIT 1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        if referenced.is_some() {
            return Err(RepositoryError::Conflict(
                "Cannot delete product with existing orders".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }

        Ok(())
    }

    /// Attach galleries, variants, and recent stock logs to product rows.
    async fn assemble(
        &self,
        rows: Vec<ProductRow>,
        logs_per_product: i64,
    ) -> Result<Vec<AdminProduct>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id.as_uuid()).collect();

        let image_rows: Vec<ImageRow> = sqlx::query_as(
            "SELECT id, product_id, url, alt, is_primary, position
             FROM product_images WHERE product_id = ANY($1)
             ORDER BY position ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let variant_rows: Vec<VariantRow> = sqlx::query_as(
            "SELECT id, product_id, name, value, price, stock, sku, is_active, position
             FROM product_variants WHERE product_id = ANY($1)
             ORDER BY position ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let log_rows: Vec<StockLogRow> = sqlx::query_as(
            "SELECT id, product_id, old_stock, new_stock, reason, created_at FROM (
                 SELECT *, ROW_NUMBER() OVER (
                     PARTITION BY product_id ORDER BY created_at DESC
                 ) AS rn
                 FROM stock_logs WHERE product_id = ANY($1)
             ) recent
             WHERE rn <= $2
             ORDER BY created_at DESC",
        )
        .bind(&ids)
        .bind(logs_per_product)
        .fetch_all(self.pool)
        .await?;

        let mut galleries: HashMap<Uuid, Vec<AdminProductImage>> = HashMap::new();
        for img in image_rows {
            galleries
                .entry(img.product_id)
                .or_default()
                .push(AdminProductImage {
                    id: img.id,
                    url: img.url,
                    alt: img.alt,
                    is_primary: img.is_primary,
                    position: img.position,
                });
        }

        let mut variants: HashMap<Uuid, Vec<AdminProductVariant>> = HashMap::new();
        for v in variant_rows {
            variants
                .entry(v.product_id)
                .or_default()
                .push(AdminProductVariant {
                    id: v.id,
                    name: v.name,
                    value: v.value,
                    price: v.price,
                    stock: v.stock,
                    sku: v.sku,
                    is_active: v.is_active,
                    position: v.position,
                });
        }

        let mut logs: HashMap<Uuid, Vec<StockLog>> = HashMap::new();
        for log in log_rows {
            logs.entry(log.product_id).or_default().push(StockLog {
                id: log.id,
                product_id: ProductId::from_uuid(log.product_id),
                old_stock: log.old_stock,
                new_stock: log.new_stock,
                reason: log.reason,
                created_at: log.created_at,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let key = row.id.as_uuid();
                AdminProduct {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                    price: row.price,
                    category: row.category,
                    stock: row.stock,
                    low_stock_threshold: row.low_stock_threshold,
                    featured: row.featured,
                    is_active: row.is_active,
                    views: row.views,
                    sales: row.sales,
                    gallery: galleries.remove(&key).unwrap_or_default(),
                    variants: variants.remove(&key).unwrap_or_default(),
                    stock_logs: logs.remove(&key).unwrap_or_default(),
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}

async fn insert_gallery(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    gallery: &[ImageInput],
) -> Result<(), RepositoryError> {
    for (index, image) in gallery.iter().enumerate() {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        sqlx::query(
            "INSERT INTO product_images (product_id, url, alt, is_primary, position)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id)
        .bind(&image.url)
        .bind(&image.alt)
        // The first image is primary unless the payload says otherwise.
        .bind(image.is_primary || index == 0)
        .bind(image.position.unwrap_or(index))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_variants(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    variants: &[VariantInput],
) -> Result<(), RepositoryError> {
    for (index, variant) in variants.iter().enumerate() {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        sqlx::query(
            "INSERT INTO product_variants
                 (product_id, name, value, price, stock, sku, is_active, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(product_id)
        .bind(&variant.name)
        .bind(&variant.value)
        .bind(variant.price)
        .bind(variant.stock)
        .bind(&variant.sku)
        .bind(variant.is_active)
        .bind(variant.position.unwrap_or(index))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_stock_log(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    old_stock: i32,
    new_stock: i32,
    reason: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO stock_logs (product_id, old_stock, new_stock, reason)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(product_id)
    .bind(old_stock)
    .bind(new_stock)
    .bind(reason)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
