//! Integration tests for admin product management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed applied
//! - The admin server running (cargo run -p puffshop-admin)
//!
//! Run with: cargo test -p puffshop-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use puffshop_integration_tests::{admin_base_url, admin_client, session_client};

fn product_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Created by integration tests",
        "price": "19.99",
        "category": "Disposable",
        "stock": 25,
        "lowStockThreshold": 5,
        "featured": false,
        "isActive": true,
        "gallery": [
            { "url": "/images/test.svg", "alt": "Test", "isPrimary": true }
        ],
        "variants": [
            { "name": "Flavor", "value": "Mint", "stock": 15 },
            { "name": "Flavor", "value": "Berry", "stock": 10, "price": "21.99" }
        ],
    })
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_unauthenticated_requests_are_rejected() {
    let client = session_client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/api/admin/products"))
        .send()
        .await
        .expect("Failed to reach admin");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_product_crud_roundtrip() {
    let client = admin_client().await;
    let base_url = admin_base_url();
    let name = format!("Test Puff {}", Uuid::new_v4());

    // Create
    let resp = client
        .post(format!("{base_url}/api/admin/products"))
        .json(&product_payload(&name))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse product");
    let id = created["id"].as_str().expect("product id").to_owned();
    assert_eq!(created["variants"].as_array().expect("variants").len(), 2);

    // Update replaces variants wholesale
    let mut update = product_payload(&name);
    update["variants"] = json!([{ "name": "Flavor", "value": "Vanilla", "stock": 9 }]);
    update["stock"] = json!(30);
    let resp = client
        .put(format!("{base_url}/api/admin/products/{id}"))
        .json(&update)
        .send()
        .await
        .expect("Failed to update product");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(updated["variants"].as_array().expect("variants").len(), 1);
    // The stock change was logged
    assert!(
        updated["stockLogs"]
            .as_array()
            .expect("stock logs")
            .iter()
            .any(|log| log["reason"] == "Admin update")
    );

    // Manual stock adjustment
    let resp = client
        .put(format!("{base_url}/api/admin/products/{id}/stock"))
        .json(&json!({ "stock": 3 }))
        .send()
        .await
        .expect("Failed to adjust stock");
    assert_eq!(resp.status(), StatusCode::OK);
    let adjusted: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(adjusted["stock"], 3);

    // Now below threshold: the product shows up in inventory alerts
    let alerts: Value = client
        .get(format!("{base_url}/api/admin/inventory/alerts"))
        .send()
        .await
        .expect("Failed to fetch alerts")
        .json()
        .await
        .expect("Failed to parse alerts");
    assert!(
        alerts["products"]
            .as_array()
            .expect("products")
            .iter()
            .any(|p| p["id"] == id.as_str())
    );

    // Delete
    let resp = client
        .delete(format!("{base_url}/api/admin/products/{id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/api/admin/products/{id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_analytics_summary_has_every_section() {
    let client = admin_client().await;
    let base_url = admin_base_url();

    let analytics: Value = client
        .get(format!("{base_url}/api/admin/analytics"))
        .send()
        .await
        .expect("Failed to fetch analytics")
        .json()
        .await
        .expect("Failed to parse analytics");

    assert!(analytics["totalSales"].is_string() || analytics["totalSales"].is_number());
    assert!(analytics["totalOrders"].is_number());
    assert!(analytics["totalCustomers"].is_number());
    assert!(analytics["todayOrders"].is_number());
    assert!(analytics["lowStockProducts"].is_number());
    // One row per day, zero-filled
    assert_eq!(analytics["salesData"].as_array().expect("sales data").len(), 7);
    assert!(analytics["topProducts"].is_array());
    assert!(analytics["orderStatusData"].is_array());
}
