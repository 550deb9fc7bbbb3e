//! Session keys for storefront state.

/// Session keys for cart and notification data.
pub mod keys {
    /// Key for the serialized `ShoppingCart`.
    pub const SHOPPING_CART: &str = "shopping_cart";

    /// Key for the one-time flash message shown after a redirect.
    pub const FLASH: &str = "flash";
}
