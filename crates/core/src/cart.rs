//! The session-scoped shopping cart.

use serde::{Deserialize, Serialize};

use crate::purchase::Purchase;

/// Holder of at most one in-progress purchase.
///
/// The storefront keeps one cart per session, serialized into the session
/// store between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    purchase: Option<Purchase>,
}

impl ShoppingCart {
    #[must_use]
    pub const fn new() -> Self {
        Self { purchase: None }
    }

    #[must_use]
    pub const fn purchase(&self) -> Option<&Purchase> {
        self.purchase.as_ref()
    }

    /// Replace the in-progress purchase.
    ///
    /// A purchase without lines is dropped instead of stored, so a cart
    /// never holds an empty purchase.
    pub fn set_purchase(&mut self, purchase: Purchase) {
        self.purchase = if purchase.is_empty() {
            None
        } else {
            Some(purchase)
        };
    }

    /// Take the purchase out of the cart, leaving it empty.
    pub fn take_purchase(&mut self) -> Option<Purchase> {
        self.purchase.take()
    }

    pub fn clear(&mut self) {
        self.purchase = None;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.purchase.is_none()
    }

    /// Total units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.purchase.as_ref().map_or(0, Purchase::item_count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::test_product;

    #[test]
    fn test_new_cart_is_empty() {
        let cart = ShoppingCart::new();
        assert!(cart.is_empty());
        assert!(cart.purchase().is_none());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_set_purchase_drops_empty_purchase() {
        let mut cart = ShoppingCart::new();
        cart.set_purchase(Purchase::new());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_and_take_purchase() {
        let mut purchase = Purchase::new();
        purchase.add_product(test_product(1, 199, 3), 2);

        let mut cart = ShoppingCart::new();
        cart.set_purchase(purchase.clone());
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.take_purchase(), Some(purchase));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_survives_serialization() {
        let mut purchase = Purchase::new();
        purchase.add_product(test_product(1, 199, 3), 1);
        let mut cart = ShoppingCart::new();
        cart.set_purchase(purchase);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: ShoppingCart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.purchase().unwrap().subtotal().to_string(), "$1.99");
    }
}
