//! Catalog repository: public product reads.
//!
//! Only active products and active variants are visible here; the admin
//! service owns the full catalog.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use puffshop_core::{ImageId, ProductId, VariantId};

use super::{RepositoryError, clamp_stock};
use crate::models::{Product, ProductImage, ProductVariant};

/// Repository for catalog reads.
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
    featured: bool,
    created_at: DateTime<Utc>,
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
    position: i32,
}

impl<'a> ProductRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first, with galleries and active variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, featured_only: bool) -> Result<Vec<Product>, RepositoryError> {
        let sql = if featured_only {
            "SELECT id, name, description, price, category, stock, featured, created_at
             FROM products WHERE is_active AND featured
             ORDER BY created_at DESC"
        } else {
            "SELECT id, name, description, price, category, stock, featured, created_at
             FROM products WHERE is_active
             ORDER BY created_at DESC"
        };

        let rows: Vec<ProductRow> = sqlx::query_as(sql).fetch_all(self.pool).await?;
        self.assemble(rows).await
    }

    /// Fetch one active product by id, with gallery and active variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, price, category, stock, featured, created_at
             FROM products WHERE id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut products = self.assemble(vec![row]).await?;
        Ok(products.pop())
    }

    /// Attach galleries and variants to a page of product rows.
    async fn assemble(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
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
            "SELECT id, product_id, name, value, price, stock, sku, position
             FROM product_variants WHERE product_id = ANY($1) AND is_active
             ORDER BY position ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut galleries: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for img in image_rows {
            galleries.entry(img.product_id).or_default().push(ProductImage {
                id: img.id,
                url: img.url,
                alt: img.alt,
                is_primary: img.is_primary,
                position: img.position,
            });
        }

        let mut variants: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
        for v in variant_rows {
            variants.entry(v.product_id).or_default().push(ProductVariant {
                id: v.id,
                name: v.name,
                value: v.value,
                price: v.price,
                stock: clamp_stock(v.stock),
                sku: v.sku,
                position: v.position,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let key = row.id.as_uuid();
                Product {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                    price: row.price,
                    category: row.category,
                    stock: clamp_stock(row.stock),
                    featured: row.featured,
                    gallery: galleries.remove(&key).unwrap_or_default(),
                    variants: variants.remove(&key).unwrap_or_default(),
                    created_at: row.created_at,
                }
            })
            .collect())
    }
}
