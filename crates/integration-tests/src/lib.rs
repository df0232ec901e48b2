//! Integration tests for Puffshop.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, then:
//! cargo run -p puffshop-cli -- migrate
//! cargo run -p puffshop-cli -- seed
//! cargo run -p puffshop-storefront &
//! cargo run -p puffshop-admin &
//!
//! cargo test -p puffshop-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d because they need the full stack; each test uses
//! its own cookie jar, so browsing sessions never bleed between tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::Value;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client with its own cookie jar - one browsing session.
///
/// # Panics
///
/// Panics if the client cannot be built (test-only code).
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in to the admin API with the seeded credentials, returning an
/// authenticated client.
///
/// # Panics
///
/// Panics if the login request fails; the admin service and seed data must
/// be in place.
pub async fn admin_client() -> Client {
    let client = session_client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&serde_json::json!({
            "email": "admin@puffshop.com",
            "password": "admin123",
        }))
        .send()
        .await
        .expect("Failed to reach admin login");
    assert!(
        resp.status().is_success(),
        "admin login failed: {}",
        resp.status()
    );

    client
}

/// Fetch the first product from the public catalog.
///
/// # Panics
///
/// Panics if the catalog is unreachable or empty; run the seed first.
pub async fn first_product(client: &Client) -> Value {
    let base_url = storefront_base_url();
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to fetch products")
        .json()
        .await
        .expect("Failed to parse products");

    products.into_iter().next().expect("Catalog is empty")
}
