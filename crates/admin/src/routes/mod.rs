//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database)
//!
//! # Auth
//! POST /auth/login                     - Password login
//! POST /auth/logout                    - End the session
//!
//! # Products (requires auth)
//! GET    /api/admin/products           - All products with stock logs
//! POST   /api/admin/products           - Create (gallery + variants)
//! GET    /api/admin/products/{id}      - Detail
//! PUT    /api/admin/products/{id}      - Update (replaces gallery/variants)
//! DELETE /api/admin/products/{id}      - Delete (refused with order history)
//! PUT    /api/admin/products/{id}/stock - Manual stock adjustment
//!
//! # Orders (requires auth)
//! GET  /api/admin/orders               - All orders with items
//! GET  /api/admin/orders/{id}          - Detail
//! PUT  /api/admin/orders/{id}          - Update status
//! GET  /api/admin/orders/{id}/invoice  - Plain-text invoice download
//!
//! # Customers (requires auth)
//! GET  /api/admin/customers            - Customers with order history
//! GET  /api/admin/customers/{id}       - Detail (items included)
//! PUT  /api/admin/customers/{id}       - Toggle account activity
//!
//! # Discounts (requires auth)
//! GET/POST       /api/admin/discounts
//! GET/PUT/DELETE /api/admin/discounts/{id}
//!
//! # Dashboard (requires auth)
//! GET  /api/admin/analytics            - Aggregates + 7-day revenue
//! GET  /api/admin/inventory/alerts     - Low-stock products
//! ```

pub mod analytics;
pub mod auth;
pub mod customers;
pub mod discounts;
pub mod inventory;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Assemble the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/api/admin/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/admin/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/admin/products/{id}/stock", put(products::update_stock))
        .route("/api/admin/orders", get(orders::list))
        .route(
            "/api/admin/orders/{id}",
            get(orders::show).put(orders::update_status),
        )
        .route("/api/admin/orders/{id}/invoice", get(orders::invoice))
        .route("/api/admin/customers", get(customers::list))
        .route(
            "/api/admin/customers/{id}",
            get(customers::show).put(customers::update),
        )
        .route(
            "/api/admin/discounts",
            get(discounts::list).post(discounts::create),
        )
        .route(
            "/api/admin/discounts/{id}",
            get(discounts::show)
                .put(discounts::update)
                .delete(discounts::delete),
        )
        .route("/api/admin/analytics", get(analytics::summary))
        .route("/api/admin/inventory/alerts", get(inventory::alerts))
}
