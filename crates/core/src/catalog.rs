//! Catalog products and the stock availability rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductId};

/// A product offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Units currently in stock.
    pub quantity: u32,
    pub full_image_name: Option<String>,
    pub thumb_image_name: Option<String>,
}

impl Product {
    /// Check that `requested` units can be ordered from current stock.
    ///
    /// # Errors
    ///
    /// Returns `AvailabilityError` if more units are requested than are in stock.
    pub fn check_quantity(&self, requested: u32) -> Result<(), AvailabilityError> {
        if requested > self.quantity {
            return Err(AvailabilityError {
                product_id: self.id,
                product_name: self.name.clone(),
                requested,
                available: self.quantity,
            });
        }
        Ok(())
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Raised when an order asks for more units than are in stock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to make {requested} order/s of {product_name}: only {available} available")]
pub struct AvailabilityError {
    pub product_id: ProductId,
    pub product_name: String,
    pub requested: u32,
    pub available: u32,
}

#[cfg(test)]
pub(crate) fn test_product(id: i64, cents: i64, quantity: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: "TestName".to_string(),
        description: "TestDesc".to_string(),
        price: Price::from_cents(cents),
        quantity,
        full_image_name: Some("imagename".to_string()),
        thumb_image_name: Some("imagename".to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_exceeding_stock_is_rejected() {
        let product = test_product(1, 199, 3);
        let err = product.check_quantity(10).unwrap_err();

        assert_eq!(err.product_name, "TestName");
        assert_eq!(err.requested, 10);
        assert_eq!(err.available, 3);
        assert_eq!(
            err.to_string(),
            "Unable to make 10 order/s of TestName: only 3 available"
        );
    }

    #[test]
    fn test_quantity_within_stock_is_accepted() {
        let product = test_product(1, 199, 3);
        assert!(product.check_quantity(1).is_ok());
        assert!(product.check_quantity(3).is_ok());
    }

    #[test]
    fn test_out_of_stock() {
        let product = test_product(1, 199, 0);
        assert!(!product.in_stock());
        assert!(product.check_quantity(1).is_err());
    }
}
