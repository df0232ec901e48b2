//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /api/products           - Active products (?featured=true for home)
//! GET  /api/products/{id}      - Product detail
//!
//! # Cart (session-backed)
//! GET  /cart                   - Cart snapshot with totals
//! POST /cart/add               - Add one unit of product(+variant)
//! POST /cart/update            - Set a line's quantity (<=0 removes)
//! POST /cart/remove            - Remove a line
//! GET  /cart/count             - Unit count (navigation badge; observers
//!                                re-fetch this after a change signal)
//!
//! # Checkout
//! POST /checkout               - Submit the snapshot to the order service,
//!                                clear the cart on success
//!
//! # Order service
//! POST /api/orders             - Create an order (revalidates the snapshot)
//! GET  /api/orders/{id}        - Order detail (confirmation view)
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Assemble the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/{id}", get(products::show))
        .route("/api/orders", post(orders::create))
        .route("/api/orders/{id}", get(orders::show))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/checkout", post(checkout::submit))
}
