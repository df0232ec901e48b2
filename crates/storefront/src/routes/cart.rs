//! Cart route handlers.
//!
//! Each handler builds a [`CartManager`] from the request's session and the
//! shared change signal; mutations persist and then signal observers, who
//! re-fetch `/cart/count` (or the full `/cart`) for the fresh snapshot.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use puffshop_core::cart::{Cart, CartLineItem, LineKey};
use puffshop_core::{ProductId, VariantId};

use crate::cart::{CartManager, CartStore};
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// One cart line as displayed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Identity key; clients pass this back to update/remove the line.
    pub key: String,
    pub product_id: ProductId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub quantity: u32,
    pub stock_ceiling: u32,
    /// e.g. "Flavor: Mint"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            key: line.key().to_string(),
            product_id: line.product_id,
            name: line.name.clone(),
            image_url: line.unit_image_url.clone(),
            unit_price: line.unit_price(),
            line_total: line.line_total(),
            quantity: line.quantity,
            stock_ceiling: line.stock_ceiling,
            variant_label: line
                .selected_variant
                .as_ref()
                .map(|v| format!("{}: {}", v.variant_name, v.variant_value)),
        }
    }
}

/// The cart as displayed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: Decimal,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub variant_value: Option<String>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub key: String,
    pub quantity: i64,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub key: String,
}

fn manager(state: &AppState, session: Session) -> CartManager {
    CartManager::new(CartStore::new(session), state.cart_events().clone())
}

/// Current cart snapshot with totals.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = manager(&state, session).snapshot().await;
    Json(CartView::from(&cart))
}

/// Add one unit of a product (with optional variant) to the cart.
///
/// The catalog is consulted here - at add-time - for the display cache,
/// price, and stock ceiling that get frozen onto the line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get(req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let variant = match (req.variant_id, req.variant_value.as_deref()) {
        (None, None) => None,
        (id, value) => {
            let found = product
                .find_variant(id, value)
                .ok_or_else(|| AppError::BadRequest("Unknown product variant".to_string()))?;
            Some(found.to_cart_snapshot(product.price))
        }
    };

    let cart = manager(&state, session)
        .add(product.to_cart_snapshot(), variant)
        .await?;
    Ok(Json(CartView::from(&cart)))
}

/// Set a line's quantity; zero or negative removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let key = LineKey::from(req.key);
    let cart = manager(&state, session)
        .update_quantity(&key, req.quantity)
        .await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let key = LineKey::from(req.key);
    let cart = manager(&state, session).remove(&key).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Unit count for the navigation badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CartCount> {
    let cart = manager(&state, session).snapshot().await;
    Json(CartCount {
        count: cart.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use puffshop_core::cart::{ProductSnapshot, VariantSnapshot};

    use super::*;

    #[test]
    fn test_view_totals_match_cart_math() {
        let mut cart = Cart::new();
        cart.add(
            ProductSnapshot {
                id: ProductId::new(),
                name: "Berry Blast Puff".to_owned(),
                image_url: None,
                price: Decimal::from(20),
                stock: 10,
            },
            Some(VariantSnapshot {
                id: Some(VariantId::new()),
                name: "Intensity".to_owned(),
                value: "Strong".to_owned(),
                price_delta: Some(Decimal::from(2)),
                stock: 10,
            }),
        );

        let view = CartView::from(&cart);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total, Decimal::from(22));
        assert_eq!(view.item_count, 1);
        assert_eq!(view.items[0].unit_price, Decimal::from(22));
        assert_eq!(view.items[0].variant_label.as_deref(), Some("Intensity: Strong"));
        assert_eq!(view.items[0].key, cart.items()[0].key().to_string());
    }
}
