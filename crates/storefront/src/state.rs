//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::cart::CartEvents;
use crate::config::StorefrontConfig;
use crate::models::Product;
use crate::services::orders::{GatewayError, OrderGateway};

/// Catalog cache TTL: hot listings may lag admin edits by this much.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(30);
const CATALOG_CACHE_CAPACITY: u64 = 64;

/// Which catalog listing a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    /// All active products.
    All,
    /// Featured active products (home page).
    Featured,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog_cache: Cache<CatalogKey, Arc<Vec<Product>>>,
    cart_events: CartEvents,
    orders: OrderGateway,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the order gateway's HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, GatewayError> {
        let orders = OrderGateway::new(config.order_api_url.clone())?;
        let catalog_cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog_cache,
                cart_events: CartEvents::new(),
                orders,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog read cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<CatalogKey, Arc<Vec<Product>>> {
        &self.inner.catalog_cache
    }

    /// Get a reference to the cart change signal.
    #[must_use]
    pub fn cart_events(&self) -> &CartEvents {
        &self.inner.cart_events
    }

    /// Get a reference to the order service gateway.
    #[must_use]
    pub fn order_gateway(&self) -> &OrderGateway {
        &self.inner.orders
    }
}
