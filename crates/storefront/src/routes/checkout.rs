//! Checkout route handler.
//!
//! Submission serializes the current cart snapshot to the order service via
//! the gateway. On success the cart is cleared and the change signal fires;
//! on failure the cart is left untouched so the user can retry.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use puffshop_core::{Email, OrderId};
use puffshop_core::cart::Cart;

use crate::cart::{CartManager, CartStore};
use crate::error::{AppError, Result};
use crate::models::{OrderDraft, OrderDraftItem};
use crate::state::AppState;

/// Checkout form: customer and shipping details.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// What the confirmation view needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub order_number: String,
}

/// Submit the cart as an order.
#[instrument(skip(state, session, req))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    validate(&req)?;

    let store = CartStore::new(session);
    let cart = store.load().await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let draft = draft_from_cart(&req, &cart);

    // Failure leaves the snapshot in place; only a confirmed order clears it.
    let receipt = state.order_gateway().submit(&draft).await?;

    let manager = CartManager::new(store, state.cart_events().clone());
    manager.clear().await?;

    Ok(Json(CheckoutResponse {
        order_id: receipt.id,
        order_number: receipt.order_number,
    }))
}

fn validate(req: &CheckoutRequest) -> Result<()> {
    if req.customer_name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if req.customer_phone.trim().is_empty() {
        return Err(AppError::BadRequest("Phone number is required".to_string()));
    }
    if req.shipping_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Shipping address is required".to_string(),
        ));
    }
    Email::parse(&req.customer_email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(())
}

/// Build the order submission from the snapshot: product id, quantity,
/// effective unit price, and the variant descriptor per line.
fn draft_from_cart(req: &CheckoutRequest, cart: &Cart) -> OrderDraft {
    OrderDraft {
        customer_name: req.customer_name.clone(),
        customer_email: req.customer_email.clone(),
        customer_phone: req.customer_phone.clone(),
        shipping_address: req.shipping_address.clone(),
        notes: req.notes.clone(),
        items: cart
            .items()
            .iter()
            .map(|line| OrderDraftItem {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price(),
                selected_variant: line.selected_variant.clone(),
            })
            .collect(),
        total: cart.total(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use puffshop_core::ProductId;
    use puffshop_core::cart::{ProductSnapshot, VariantSnapshot};

    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Ada Buyer".to_owned(),
            customer_email: "ada@example.com".to_owned(),
            customer_phone: "555-0100".to_owned(),
            shipping_address: "1 Main St".to_owned(),
            notes: None,
        }
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut req = request();
        req.customer_name = "   ".to_owned();
        assert!(validate(&req).is_err());

        let mut req = request();
        req.customer_email = "not-an-email".to_owned();
        assert!(validate(&req).is_err());

        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_draft_carries_effective_prices_and_variants() {
        let mut cart = Cart::new();
        cart.add(
            ProductSnapshot {
                id: ProductId::new(),
                name: "Mint Fresh Puff".to_owned(),
                image_url: None,
                price: Decimal::from(25),
                stock: 40,
            },
            Some(VariantSnapshot {
                id: None,
                name: "Size".to_owned(),
                value: "Large".to_owned(),
                price_delta: Some(Decimal::from(5)),
                stock: 35,
            }),
        );

        let draft = draft_from_cart(&request(), &cart);
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].unit_price, Decimal::from(30));
        assert_eq!(draft.total, Decimal::from(30));
        assert_eq!(
            draft.items[0]
                .selected_variant
                .as_ref()
                .unwrap()
                .variant_value,
            "Large"
        );
    }
}
