//! Database seed command.
//!
//! Creates the default admin account and, when the catalog is empty, a
//! small set of sample products with galleries and variants. Safe to run
//! repeatedly: an existing admin is kept, existing products are left alone.
//!
//! ```bash
//! puffshop seed
//! ```

use rust_decimal::Decimal;

use puffshop_admin::db::products::ProductRepository;
use puffshop_admin::models::{ImageInput, ProductInput, VariantInput};
use puffshop_admin::services::auth::{AuthError, AuthService};

use super::connect;

/// Default admin credentials for development setups.
const ADMIN_EMAIL: &str = "admin@puffshop.com";
const ADMIN_NAME: &str = "Admin User";
const ADMIN_PASSWORD: &str = "admin123";

/// Seed the database.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    tracing::info!("Starting database seed...");

    // Admin account
    match AuthService::new(&pool)
        .create_admin(ADMIN_EMAIL, ADMIN_NAME, ADMIN_PASSWORD)
        .await
    {
        Ok(admin) => tracing::info!("Created admin account: {}", admin.email),
        Err(AuthError::AlreadyExists) => {
            tracing::info!("Admin account already exists, skipping");
        }
        Err(e) => return Err(e.into()),
    }

    // Sample catalog
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::info!("Products already exist ({existing}), skipping product creation");
        tracing::info!("Database seed complete");
        return Ok(());
    }

    let repo = ProductRepository::new(&pool);
    for input in sample_products() {
        let product = repo.create(&input).await?;
        tracing::info!("Created product: {}", product.name);
    }

    tracing::info!("Database seed complete");
    tracing::info!("Admin login: {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    Ok(())
}

/// The sample catalog: a few products covering the variant shapes the
/// storefront has to handle (price overrides, value-only options).
fn sample_products() -> Vec<ProductInput> {
    vec![
        ProductInput {
            name: "Premium Puff Pro".to_string(),
            description: "High-quality disposable vape with premium flavors and \
                          long-lasting battery."
                .to_string(),
            price: Decimal::new(2999, 2),
            category: "Disposable".to_string(),
            stock: 50,
            low_stock_threshold: 10,
            featured: true,
            is_active: true,
            gallery: vec![
                image("/images/premium-puff-pro-main.svg", "Premium Puff Pro - Main View", true),
                image("/images/premium-puff-pro-side.svg", "Premium Puff Pro - Side View", false),
            ],
            variants: vec![
                variant("Flavor", "Mint", None, 20),
                variant("Flavor", "Berry", None, 15),
                variant("Flavor", "Vanilla", None, 15),
            ],
        },
        ProductInput {
            name: "Mint Fresh Puff".to_string(),
            description: "Refreshing mint flavor with smooth vapor production.".to_string(),
            price: Decimal::new(2499, 2),
            category: "Disposable".to_string(),
            stock: 75,
            low_stock_threshold: 15,
            featured: true,
            is_active: true,
            gallery: vec![image(
                "/images/mint-fresh-puff.svg",
                "Mint Fresh Puff - Main",
                true,
            )],
            variants: vec![
                variant("Size", "Regular", None, 40),
                // Absolute price override; the storefront turns it into a delta.
                variant("Size", "Large", Some(Decimal::new(2999, 2)), 35),
            ],
        },
        ProductInput {
            name: "Berry Blast Puff".to_string(),
            description: "Sweet berry flavor combination made with natural extracts.".to_string(),
            price: Decimal::new(2799, 2),
            category: "Disposable".to_string(),
            stock: 60,
            low_stock_threshold: 12,
            featured: false,
            is_active: true,
            gallery: vec![image("/images/berry-blast-puff.svg", "Berry Blast Puff", true)],
            variants: vec![
                variant("Intensity", "Mild", None, 30),
                variant("Intensity", "Strong", None, 30),
            ],
        },
    ]
}

fn image(url: &str, alt: &str, is_primary: bool) -> ImageInput {
    ImageInput {
        url: url.to_string(),
        alt: alt.to_string(),
        is_primary,
        position: None,
    }
}

fn variant(name: &str, value: &str, price: Option<Decimal>, stock: i32) -> VariantInput {
    VariantInput {
        name: name.to_string(),
        value: value.to_string(),
        price,
        stock,
        sku: None,
        is_active: true,
        position: None,
    }
}
