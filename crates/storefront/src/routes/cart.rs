//! Cart route handlers.
//!
//! The cart lives in the session as a serialized `ShoppingCart`. Every
//! mutation persists the purchase through `PurchaseService` before the
//! session copy is replaced. Anything that leaves the cart inconsistent
//! (unknown product, no purchase, product not in the cart) ends on the
//! generic error page; stock shortfalls are reported with a failure flash.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use acme_shop_core::{Product, ProductId, ProductPurchase, Purchase, ShoppingCart};

use super::{CART_PATH, PRODUCTS_PATH};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::{Flash, session_keys};
use crate::services::ServiceError;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub thumb_image: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&ProductPurchase> for CartItemView {
    fn from(line: &ProductPurchase) -> Self {
        Self {
            product_id: line.product.id.as_i64(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            price: line.product.price.to_string(),
            line_price: line.line_total().to_string(),
            thumb_image: line.product.thumb_image_name.clone(),
        }
    }
}

impl From<&Purchase> for CartView {
    fn from(purchase: &Purchase) -> Self {
        Self {
            items: purchase
                .product_purchases
                .iter()
                .map(CartItemView::from)
                .collect(),
            subtotal: purchase.subtotal().to_string(),
            item_count: purchase.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the shopping cart from the session (empty if none yet).
async fn load_cart(session: &Session) -> Result<ShoppingCart> {
    Ok(session
        .get::<ShoppingCart>(session_keys::SHOPPING_CART)
        .await?
        .unwrap_or_default())
}

/// Write the shopping cart back to the session.
async fn store_cart(session: &Session, cart: &ShoppingCart) -> Result<()> {
    session.insert(session_keys::SHOPPING_CART, cart).await?;
    Ok(())
}

/// Look up a product, treating an unknown ID as not found.
async fn find_product(state: &AppState, id: i64) -> Result<Product> {
    state
        .products()
        .find_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

fn no_purchase() -> AppError {
    AppError::InvalidCart("cart has no purchase".to_string())
}

fn require_quantity(quantity: u32) -> Result<u32> {
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(quantity)
}

/// Flash a failure and send the shopper back to `to`.
async fn reject(session: &Session, message: String, to: &str) -> Result<Redirect> {
    tracing::info!(%message, "Cart operation rejected");
    Flash::failure(message).push(session).await?;
    Ok(Redirect::to(to))
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    pub product_id: i64,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartForm {
    pub product_id: i64,
    pub new_quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartForm {
    pub product_id: i64,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub flash: Option<Flash>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    let purchase = cart.purchase().ok_or_else(no_purchase)?;
    let flash = Flash::take(&session).await?;

    Ok(CartShowTemplate {
        cart: CartView::from(purchase),
        flash,
    }
    .into_response())
}

/// Add a product to the cart, merging with an existing line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let quantity = require_quantity(form.quantity.unwrap_or(1))?;
    let product = find_product(&state, form.product_id).await?;

    let mut cart = load_cart(&session).await?;
    let mut purchase = cart.take_purchase().unwrap_or_default();

    let requested = purchase.quantity_of(product.id).saturating_add(quantity);
    if let Err(err) = state.products().check_quantity(&product, requested) {
        return reject(&session, err.to_string(), PRODUCTS_PATH).await;
    }

    let name = product.name.clone();
    purchase.add_product(product, quantity);
    cart.set_purchase(state.purchases().save(purchase).await?);
    store_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", form.product_id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );
    Flash::success(format!("Added {quantity} x {name} to your cart"))
        .push(&session)
        .await?;

    Ok(Redirect::to(PRODUCTS_PATH))
}

/// Set the quantity of a cart line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let quantity = require_quantity(form.new_quantity)?;
    let product = find_product(&state, form.product_id).await?;

    let mut cart = load_cart(&session).await?;
    let mut purchase = cart.take_purchase().ok_or_else(no_purchase)?;

    if purchase.line_for(product.id).is_none() {
        return Err(AppError::InvalidCart(format!(
            "product {} is not in the cart",
            product.id
        )));
    }
    if let Err(err) = state.products().check_quantity(&product, quantity) {
        return reject(&session, err.to_string(), CART_PATH).await;
    }

    let name = product.name.clone();
    purchase.update_line(product, quantity);
    cart.set_purchase(state.purchases().save(purchase).await?);
    store_cart(&session, &cart).await?;

    Flash::success(format!("Updated {name} to {quantity}"))
        .push(&session)
        .await?;

    Ok(Redirect::to(CART_PATH))
}

/// Remove a product's line from the cart.
///
/// Removing the last line drops the purchase from the session and sends
/// the shopper back to the catalog.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let product = find_product(&state, form.product_id).await?;

    let mut cart = load_cart(&session).await?;
    let mut purchase = cart.take_purchase().ok_or_else(no_purchase)?;

    if purchase.remove_product(product.id).is_none() {
        return Err(AppError::InvalidCart(format!(
            "product {} is not in the cart",
            product.id
        )));
    }

    let saved = state.purchases().save(purchase).await?;
    let was_last = saved.is_empty();
    cart.set_purchase(saved);
    store_cart(&session, &cart).await?;

    Flash::success(format!("Removed {} from your cart", product.name))
        .push(&session)
        .await?;

    Ok(Redirect::to(if was_last { PRODUCTS_PATH } else { CART_PATH }))
}

/// Remove every line from the cart.
#[instrument(skip(state, session))]
pub async fn empty(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    let mut purchase = cart.take_purchase().ok_or_else(no_purchase)?;

    purchase.clear();
    state.purchases().save(purchase).await?;
    cart.clear();
    store_cart(&session, &cart).await?;

    Flash::success("Your cart has been emptied")
        .push(&session)
        .await?;

    Ok(Redirect::to(PRODUCTS_PATH))
}

/// Place the cart's purchase as an order.
///
/// Every line is re-checked against current stock before the order is
/// placed; the stock reservation itself is atomic in the purchase service.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    let mut purchase = cart.purchase().cloned().ok_or_else(no_purchase)?;

    for line in &mut purchase.product_purchases {
        let product = find_product(&state, line.product.id.as_i64()).await?;
        if let Err(err) = state.products().check_quantity(&product, line.quantity) {
            return reject(&session, err.to_string(), CART_PATH).await;
        }
        line.product = product;
    }

    let placed = match state.purchases().place_order(purchase).await {
        Ok(placed) => placed,
        Err(ServiceError::Unavailable(err)) => {
            return reject(&session, err.to_string(), CART_PATH).await;
        }
        Err(err) => return Err(err.into()),
    };

    cart.clear();
    store_cart(&session, &cart).await?;

    let order_number = placed.id.map(|id| id.to_string()).unwrap_or_default();
    add_breadcrumb("checkout", "Order placed", &[("purchase_id", order_number.clone())]);
    Flash::success(format!(
        "Thank you for your purchase! Your order number is {order_number}"
    ))
    .push(&session)
    .await?;

    Ok(Redirect::to(PRODUCTS_PATH))
}

#[cfg(test)]
mod tests {
    use acme_shop_core::{Price, PurchaseId};

    use super::*;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            quantity: 10,
            full_image_name: None,
            thumb_image_name: Some(format!("thumb-{id}.png")),
        }
    }

    #[test]
    fn test_cart_view_from_purchase() {
        let mut purchase = Purchase::new();
        purchase.id = Some(PurchaseId::new(1));
        purchase.add_product(product(1, 199), 1);
        purchase.add_product(product(2, 250), 2);

        let view = CartView::from(&purchase);

        assert_eq!(view.subtotal, "$6.99");
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[1].price, "$2.50");
        assert_eq!(view.items[1].line_price, "$5.00");
        assert_eq!(view.items[0].thumb_image.as_deref(), Some("thumb-1.png"));
    }

    #[test]
    fn test_single_line_subtotal() {
        let mut purchase = Purchase::new();
        purchase.add_product(product(1, 199), 1);

        assert_eq!(CartView::from(&purchase).subtotal, "$1.99");
    }

    #[test]
    fn test_require_quantity() {
        assert!(require_quantity(0).is_err());
        assert!(matches!(require_quantity(2), Ok(2)));
    }
}
