//! Purchases and their line items.
//!
//! A `Purchase` is the aggregate a shopper builds up in the cart and that is
//! later placed as an order. Lines keep the order in which products were
//! first added, and each product appears on at most one line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId, ProductPurchaseId, PurchaseId};

/// A quantity of one product within a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPurchase {
    /// Assigned when the line is persisted.
    pub id: Option<ProductPurchaseId>,
    pub quantity: u32,
    pub product: Product,
}

impl ProductPurchase {
    /// Create an unsaved line.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self {
            id: None,
            quantity,
            product,
        }
    }

    /// `quantity × price` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// A checkout aggregate containing ordered line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Assigned when the purchase is first persisted.
    pub id: Option<PurchaseId>,
    pub product_purchases: Vec<ProductPurchase>,
    /// Set once the purchase has been placed as an order.
    pub placed_at: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Create an empty, unsaved purchase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// The line's product snapshot is refreshed so the cart shows the
    /// latest name and price.
    pub fn add_product(&mut self, product: Product, quantity: u32) {
        if let Some(line) = self.line_for_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            line.product = product;
        } else {
            self.product_purchases
                .push(ProductPurchase::new(product, quantity));
        }
    }

    /// Find the line for a product.
    #[must_use]
    pub fn line_for(&self, product_id: ProductId) -> Option<&ProductPurchase> {
        self.product_purchases
            .iter()
            .find(|line| line.product.id == product_id)
    }

    fn line_for_mut(&mut self, product_id: ProductId) -> Option<&mut ProductPurchase> {
        self.product_purchases
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }

    /// Units of a product already in this purchase (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line_for(product_id).map_or(0, |line| line.quantity)
    }

    /// Set the quantity of an existing line.
    ///
    /// Like [`Purchase::add_product`], the line's product snapshot is
    /// refreshed. Returns `false` if the product has no line in this
    /// purchase.
    pub fn update_line(&mut self, product: Product, quantity: u32) -> bool {
        match self.line_for_mut(product.id) {
            Some(line) => {
                line.quantity = quantity;
                line.product = product;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product, returning it if it existed.
    pub fn remove_product(&mut self, product_id: ProductId) -> Option<ProductPurchase> {
        let index = self
            .product_purchases
            .iter()
            .position(|line| line.product.id == product_id)?;
        Some(self.product_purchases.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.product_purchases.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_purchases.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.product_purchases
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of `quantity × price` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product_purchases
            .iter()
            .map(ProductPurchase::line_total)
            .sum()
    }

    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.placed_at.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::test_product;

    fn purchase_with(lines: &[(i64, i64, u32)]) -> Purchase {
        let mut purchase = Purchase::new();
        for &(id, cents, quantity) in lines {
            purchase.add_product(test_product(id, cents, 10), quantity);
        }
        purchase
    }

    #[test]
    fn test_subtotal_single_line() {
        let purchase = purchase_with(&[(1, 199, 1)]);
        assert_eq!(purchase.subtotal(), Price::from_cents(199));
        assert_eq!(purchase.subtotal().to_string(), "$1.99");
    }

    #[test]
    fn test_subtotal_multiple_lines() {
        let purchase = purchase_with(&[(1, 199, 1), (2, 250, 2)]);
        assert_eq!(purchase.subtotal(), Price::from_cents(699));
        assert_eq!(purchase.item_count(), 3);
    }

    #[test]
    fn test_empty_subtotal_is_zero() {
        assert_eq!(Purchase::new().subtotal(), Price::ZERO);
    }

    #[test]
    fn test_add_merges_existing_line() {
        let mut purchase = purchase_with(&[(1, 199, 1)]);
        purchase.add_product(test_product(1, 199, 10), 2);

        assert_eq!(purchase.product_purchases.len(), 1);
        assert_eq!(purchase.quantity_of(ProductId::new(1)), 3);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let purchase = purchase_with(&[(2, 100, 1), (1, 100, 1)]);
        let ids: Vec<i64> = purchase
            .product_purchases
            .iter()
            .map(|line| line.product.id.as_i64())
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_update_line() {
        let mut purchase = purchase_with(&[(1, 199, 1)]);
        assert!(purchase.update_line(test_product(1, 199, 10), 2));
        assert_eq!(purchase.quantity_of(ProductId::new(1)), 2);
        assert!(!purchase.update_line(test_product(9, 199, 10), 2));
    }

    #[test]
    fn test_update_line_refreshes_snapshot() {
        let mut purchase = purchase_with(&[(1, 199, 1)]);

        purchase.update_line(test_product(1, 500, 10), 2);

        assert_eq!(purchase.subtotal(), Price::from_cents(1000));
    }

    #[test]
    fn test_remove_product() {
        let mut purchase = purchase_with(&[(1, 199, 1), (2, 199, 2)]);
        let removed = purchase.remove_product(ProductId::new(1)).unwrap();

        assert_eq!(removed.product.id, ProductId::new(1));
        assert_eq!(purchase.product_purchases.len(), 1);
        assert!(purchase.remove_product(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_clear() {
        let mut purchase = purchase_with(&[(1, 199, 1), (2, 199, 2)]);
        purchase.clear();
        assert!(purchase.is_empty());
        assert_eq!(purchase.item_count(), 0);
    }
}
