//! Integration tests for the storefront cart.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed applied
//! - The storefront server running (cargo run -p puffshop-storefront)
//!
//! Run with: cargo test -p puffshop-integration-tests -- --ignored

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use puffshop_integration_tests::{first_product, session_client, storefront_base_url};

async fn add_to_cart(client: &reqwest::Client, product: &Value) -> Value {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&json!({ "productId": product["id"] }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse cart view")
}

// ============================================================================
// Merge & Count
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_double_add_merges_into_one_line() {
    let client = session_client();
    let product = first_product(&client).await;

    add_to_cart(&client, &product).await;
    let cart = add_to_cart(&client, &product).await;

    let items = cart["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(cart["itemCount"], 2);

    // total == unit price * 2 (prices serialize as strings)
    let unit: Decimal = items[0]["unitPrice"]
        .as_str()
        .expect("unit price")
        .parse()
        .expect("decimal unit price");
    let total: Decimal = cart["total"]
        .as_str()
        .expect("total")
        .parse()
        .expect("decimal total");
    assert_eq!(total, unit * Decimal::from(2));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_count_endpoint_tracks_the_badge() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = first_product(&client).await;

    add_to_cart(&client, &product).await;
    add_to_cart(&client, &product).await;

    let count: Value = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to fetch count")
        .json()
        .await
        .expect("Failed to parse count");
    assert_eq!(count["count"], 2);
}

// ============================================================================
// Update & Remove
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_zero_quantity_removes_the_line() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = first_product(&client).await;

    let cart = add_to_cart(&client, &product).await;
    let key = cart["items"][0]["key"].as_str().expect("line key");

    let cart: Value = client
        .post(format!("{base_url}/cart/update"))
        .json(&json!({ "key": key, "quantity": 0 }))
        .send()
        .await
        .expect("Failed to update cart")
        .json()
        .await
        .expect("Failed to parse cart view");

    assert_eq!(cart["items"].as_array().expect("items array").len(), 0);
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_oversized_quantity_clamps_to_stock() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = first_product(&client).await;
    let stock = product["stock"].as_u64().expect("stock");

    let cart = add_to_cart(&client, &product).await;
    let key = cart["items"][0]["key"].as_str().expect("line key");

    let cart: Value = client
        .post(format!("{base_url}/cart/update"))
        .json(&json!({ "key": key, "quantity": stock + 100 }))
        .send()
        .await
        .expect("Failed to update cart")
        .json()
        .await
        .expect("Failed to parse cart view");

    assert_eq!(cart["items"][0]["quantity"].as_u64(), Some(stock));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_removing_an_unknown_key_is_a_noop() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = first_product(&client).await;

    add_to_cart(&client, &product).await;

    let cart: Value = client
        .post(format!("{base_url}/cart/remove"))
        .json(&json!({ "key": "00000000-0000-0000-0000-000000000000" }))
        .send()
        .await
        .expect("Failed to post remove")
        .json()
        .await
        .expect("Failed to parse cart view");

    assert_eq!(cart["items"].as_array().expect("items array").len(), 1);
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_cart_survives_within_a_session_but_not_across() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = first_product(&client).await;

    add_to_cart(&client, &product).await;

    // Same cookie jar: the snapshot is still there.
    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart view");
    assert_eq!(cart["itemCount"], 1);

    // A fresh browsing session sees an empty cart.
    let stranger = session_client();
    let cart: Value = stranger
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart view");
    assert_eq!(cart["itemCount"], 0);
}
