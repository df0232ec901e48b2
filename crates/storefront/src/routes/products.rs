//! Catalog route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use puffshop_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::{AppState, CatalogKey};

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict to featured products (home page).
    #[serde(default)]
    pub featured: bool,
}

/// List active products, newest first.
///
/// Served through a short-TTL cache: listings are the hottest reads and may
/// lag admin edits by the TTL.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let key = if query.featured {
        CatalogKey::Featured
    } else {
        CatalogKey::All
    };

    let products = state
        .catalog_cache()
        .try_get_with(key, async {
            ProductRepository::new(state.pool())
                .list(query.featured)
                .await
                .map(Arc::new)
        })
        .await
        .map_err(|e| AppError::Internal(format!("catalog read failed: {e}")))?;

    Ok(Json(products.as_ref().clone()))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}
