//! Inventory alert route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminProduct;
use crate::state::AppState;

/// Inventory alerts payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAlerts {
    /// Products at or below their low-stock threshold, most depleted first,
    /// each with its recent stock movements.
    pub products: Vec<AdminProduct>,
    pub count: usize,
}

/// Low-stock products with their recent stock logs.
#[instrument(skip(state))]
pub async fn alerts(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<InventoryAlerts>> {
    let products = ProductRepository::new(state.pool()).low_stock().await?;
    Ok(Json(InventoryAlerts {
        count: products.len(),
        products,
    }))
}
