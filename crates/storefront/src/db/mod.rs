//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables (schema `shop`)
//!
//! - `product` - Catalog entries and stock on hand
//! - `purchase` - Cart aggregates and placed orders
//! - `product_purchase` - Purchase line items, ordered by `position`
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p acme-shop-cli -- migrate
//! ```

pub mod products;
pub mod purchases;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use products::{NewProduct, ProductRepository};
pub use purchases::{PlaceOutcome, PurchaseRepository};

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A value cannot be represented in its column.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a domain quantity into an `INTEGER` column value.
pub(crate) fn to_db_quantity(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::InvalidInput(format!("quantity {quantity} is too large")))
}

/// Convert an `INTEGER` column value into a domain quantity.
pub(crate) fn from_db_quantity(quantity: i32) -> Result<u32, RepositoryError> {
    u32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative quantity {quantity}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_conversions() {
        assert_eq!(to_db_quantity(3).ok(), Some(3));
        assert!(matches!(
            to_db_quantity(u32::MAX),
            Err(RepositoryError::InvalidInput(_))
        ));
        assert_eq!(from_db_quantity(3).ok(), Some(3));
        assert!(matches!(
            from_db_quantity(-1),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
