//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Redirect to the catalog
//! GET  /error             - Generic error page
//!
//! # Products
//! GET  /product/          - Product listing (?page=N)
//! GET  /product/{id}      - Product detail
//!
//! # Cart (form posts, redirect + flash)
//! GET  /cart              - Cart page
//! POST /cart/add          - Add to cart (productId, quantity)
//! POST /cart/update       - Update quantity (productId, newQuantity)
//! POST /cart/remove       - Remove line (productId)
//! POST /cart/empty        - Remove every line
//!
//! # Checkout
//! POST /checkout          - Place the cart as an order
//! ```

pub mod cart;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Catalog listing path; the landing page after most cart operations.
pub const PRODUCTS_PATH: &str = "/product/";

/// Cart page path.
pub const CART_PATH: &str = "/cart";

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/product", get(pages::home))
        .route("/product/", get(products::index))
        .route("/product/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/empty", post(cart::empty))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/error", get(pages::error))
        .merge(product_routes())
        .merge(cart_routes())
}
