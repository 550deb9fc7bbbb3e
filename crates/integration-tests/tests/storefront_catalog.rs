//! Integration tests for catalog pages and site-level routes.

use axum::http::StatusCode;

use acme_shop_integration_tests::{TestContext, product};

fn catalog(count: i64) -> Vec<acme_shop_core::Product> {
    (1..=count)
        .map(|id| product(id, &format!("Product {id}"), 100 * id, 5))
        .collect()
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let mut ctx = TestContext::new(catalog(1));

    assert!(ctx.get("/").await.redirects_to("/product/"));
    assert!(ctx.get("/product").await.redirects_to("/product/"));
}

#[tokio::test]
async fn test_listing_shows_products() {
    let mut ctx = TestContext::new(catalog(3));

    let response = ctx.get("/product/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Product 1"));
    assert!(response.body.contains("Product 3"));
    assert!(response.body.contains("$3.00"));
    assert!(response.body.contains("Page 1 of 1"));
}

#[tokio::test]
async fn test_listing_paginates() {
    let mut ctx = TestContext::with_page_size(catalog(5), 2);

    let response = ctx.get("/product/?page=2").await;

    assert!(response.body.contains("Page 2 of 3"));
    assert!(response.body.contains("Product 3"));
    assert!(response.body.contains("Product 4"));
    assert!(!response.body.contains("Product 5"));
    assert!(response.body.contains("/product/?page=1"));
    assert!(response.body.contains("/product/?page=3"));
}

#[tokio::test]
async fn test_listing_page_zero_is_first_page() {
    let mut ctx = TestContext::with_page_size(catalog(5), 2);

    let response = ctx.get("/product/?page=0").await;

    assert!(response.body.contains("Page 1 of 3"));
}

#[tokio::test]
async fn test_empty_catalog() {
    let mut ctx = TestContext::new(Vec::new());

    let response = ctx.get("/product/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("No products are available"));
}

#[tokio::test]
async fn test_product_detail() {
    let mut ctx = TestContext::new(vec![product(7, "Ceramic Mug", 1200, 4)]);

    let response = ctx.get("/product/7").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Ceramic Mug"));
    assert!(response.body.contains("$12.00"));
    assert!(response.body.contains("4 in stock"));
}

#[tokio::test]
async fn test_sold_out_product_has_no_add_form() {
    let mut ctx = TestContext::new(vec![product(7, "Ceramic Mug", 1200, 0)]);

    let response = ctx.get("/product/7").await;

    assert!(response.body.contains("Sold out"));
    assert!(!response.body.contains(r#"action="/cart/add""#));
}

#[tokio::test]
async fn test_unknown_product_redirects_to_error() {
    let mut ctx = TestContext::new(catalog(1));

    assert!(ctx.get("/product/999").await.redirects_to("/error"));
}
