//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use acme_shop_core::{Page, PageRequest, Product, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Flash;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: u32,
    pub in_stock: bool,
    pub full_image: Option<String>,
    pub thumb_image: Option<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            price: product.price.to_string(),
            in_stock: product.in_stock(),
            quantity: product.quantity,
            name: product.name,
            description: product.description,
            full_image: product.full_image_name,
            thumb_image: product.thumb_image_name,
        }
    }
}

/// Pagination links for the listing page (1-based page numbers).
#[derive(Clone)]
pub struct PaginationView {
    pub current_page: u64,
    pub total_pages: u64,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl<T> From<&Page<T>> for PaginationView {
    fn from(page: &Page<T>) -> Self {
        let current_page = u64::from(page.request.number()) + 1;
        Self {
            current_page,
            total_pages: page.total_pages(),
            previous_page: page.has_previous().then(|| current_page - 1),
            next_page: page.has_next().then(|| current_page + 1),
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub pagination: PaginationView,
    pub flash: Option<Flash>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub flash: Option<Flash>,
}

/// Display the product listing page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PaginationQuery>,
) -> Result<Response> {
    let number = query.page.unwrap_or(1).max(1) - 1;
    let request = PageRequest::new(number, state.config().page_size);

    let page = state.products().find_page(request).await?;
    let pagination = PaginationView::from(&page);
    let flash = Flash::take(&session).await?;

    Ok(ProductsIndexTemplate {
        products: page.items.into_iter().map(ProductView::from).collect(),
        pagination,
        flash,
    }
    .into_response())
}

/// Display the product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response> {
    let product = state
        .products()
        .find_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let flash = Flash::take(&session).await?;

    Ok(ProductShowTemplate {
        product: ProductView::from(product),
        flash,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use acme_shop_core::Price;

    use super::*;

    #[test]
    fn test_product_view() {
        let view = ProductView::from(Product {
            id: ProductId::new(4),
            name: "Tea".to_string(),
            description: "Green".to_string(),
            price: Price::from_cents(450),
            quantity: 0,
            full_image_name: Some("tea.png".to_string()),
            thumb_image_name: None,
        });

        assert_eq!(view.id, 4);
        assert_eq!(view.price, "$4.50");
        assert!(!view.in_stock);
        assert_eq!(view.full_image.as_deref(), Some("tea.png"));
    }

    #[test]
    fn test_pagination_view_middle_page() {
        let page: Page<()> = Page::new(vec![(); 2], PageRequest::new(1, 2), 6);
        let view = PaginationView::from(&page);

        assert_eq!(view.current_page, 2);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.previous_page, Some(1));
        assert_eq!(view.next_page, Some(3));
    }

    #[test]
    fn test_pagination_view_single_page() {
        let page: Page<()> = Page::new(Vec::new(), PageRequest::new(0, 12), 0);
        let view = PaginationView::from(&page);

        assert_eq!(view.current_page, 1);
        assert_eq!(view.previous_page, None);
        assert_eq!(view.next_page, None);
    }
}
