//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{ProductService, PurchaseService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the catalog and purchase services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: Arc<dyn ProductService>,
    purchases: Arc<dyn PurchaseService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `products` - Catalog service
    /// * `purchases` - Purchase persistence service
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        products: Arc<dyn ProductService>,
        purchases: Arc<dyn PurchaseService>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                purchases,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the catalog service.
    #[must_use]
    pub fn products(&self) -> &dyn ProductService {
        self.inner.products.as_ref()
    }

    /// Get the purchase service.
    #[must_use]
    pub fn purchases(&self) -> &dyn PurchaseService {
        self.inner.purchases.as_ref()
    }
}
