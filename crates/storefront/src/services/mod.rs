//! Business services used by the route handlers.
//!
//! Handlers only see the [`ProductService`] and [`PurchaseService`] traits
//! through `AppState`, so the `PostgreSQL` implementations here can be
//! swapped for in-memory ones in tests.

pub mod catalog;
pub mod purchases;

use async_trait::async_trait;
use thiserror::Error;

use acme_shop_core::{AvailabilityError, Page, PageRequest, Product, ProductId, Purchase};

use crate::db::RepositoryError;

pub use catalog::PgProductService;
pub use purchases::PgPurchaseService;

/// Errors returned by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Not enough stock to satisfy an order line.
    #[error(transparent)]
    Unavailable(#[from] AvailabilityError),
}

/// Catalog lookups and the stock availability rule.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Every product in the catalog.
    async fn find_all(&self) -> Result<Vec<Product>, ServiceError>;

    /// One page of the catalog.
    async fn find_page(&self, request: PageRequest) -> Result<Page<Product>, ServiceError>;

    /// A single product, or `None` if the ID is unknown.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError>;

    /// Check that `requested` units of `product` can be ordered.
    ///
    /// # Errors
    ///
    /// Returns `AvailabilityError` if more units are requested than are in stock.
    fn check_quantity(&self, product: &Product, requested: u32) -> Result<(), AvailabilityError> {
        product.check_quantity(requested)
    }
}

/// Purchase persistence and order placement.
#[async_trait]
pub trait PurchaseService: Send + Sync {
    /// Persist a purchase, returning it with IDs assigned.
    async fn save(&self, purchase: Purchase) -> Result<Purchase, ServiceError>;

    /// Reserve stock for every line and mark the purchase as placed.
    ///
    /// Fails with [`ServiceError::Unavailable`] if any line exceeds the
    /// stock on hand, in which case nothing is written.
    async fn place_order(&self, purchase: Purchase) -> Result<Purchase, ServiceError>;
}
