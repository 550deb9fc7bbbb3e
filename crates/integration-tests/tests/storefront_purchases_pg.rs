//! `PostgreSQL` tests for purchase persistence and stock reservation.
//!
//! These tests require a running `PostgreSQL` database. The connection
//! string is read from `STOREFRONT_TEST_DATABASE_URL` (falling back to
//! `DATABASE_URL`); storefront migrations are applied on connect. Every
//! test creates its own uniquely named products, so the tests can share a
//! database and run in parallel.
//!
//! Run with: cargo test -p acme-shop-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use acme_shop_core::{Price, Product, ProductId, Purchase, PurchaseId};
use acme_shop_storefront::db::{
    self, NewProduct, PlaceOutcome, ProductRepository, PurchaseRepository, RepositoryError,
};

async fn test_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_TEST_DATABASE_URL or DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

async fn stocked_product(pool: &PgPool, cents: i64, quantity: u32) -> Product {
    ProductRepository::new(pool)
        .upsert(&NewProduct {
            name: format!("Test product {}", Uuid::new_v4()),
            description: String::new(),
            price: Price::from_cents(cents),
            quantity,
            full_image_name: None,
            thumb_image_name: None,
        })
        .await
        .expect("Failed to create product")
}

async fn stock(pool: &PgPool, id: ProductId) -> u32 {
    ProductRepository::new(pool)
        .get_by_id(id)
        .await
        .unwrap()
        .expect("product exists")
        .quantity
}

// ============================================================================
// Save
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_save_assigns_ids_and_rewrites_lines() {
    let pool = test_pool().await;
    let tea = stocked_product(&pool, 450, 10).await;
    let mug = stocked_product(&pool, 1200, 10).await;
    let repository = PurchaseRepository::new(&pool);

    let mut purchase = Purchase::new();
    purchase.add_product(tea.clone(), 1);
    purchase.add_product(mug.clone(), 2);

    let saved = repository.save(&purchase).await.unwrap();
    let purchase_id = saved.id.expect("purchase id assigned");
    let first_line_ids: Vec<_> = saved
        .product_purchases
        .iter()
        .map(|line| line.id.expect("line id assigned"))
        .collect();
    assert_eq!(first_line_ids.len(), 2);

    let mut changed = saved.clone();
    changed.remove_product(tea.id);
    let resaved = repository.save(&changed).await.unwrap();

    assert_eq!(resaved.id, Some(purchase_id));
    assert_eq!(resaved.product_purchases.len(), 1);
    assert_eq!(resaved.product_purchases[0].product.id, mug.id);
    let new_line_id = resaved.product_purchases[0].id.expect("line id assigned");
    assert!(!first_line_ids.contains(&new_line_id));

    let stored_lines: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM shop.product_purchase WHERE purchase_id = $1")
            .bind(purchase_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored_lines, 1);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_save_unknown_purchase_is_not_found() {
    let pool = test_pool().await;
    let tea = stocked_product(&pool, 450, 10).await;

    let mut purchase = Purchase::new();
    purchase.id = Some(PurchaseId::new(i64::MAX));
    purchase.add_product(tea, 1);

    let result = PurchaseRepository::new(&pool).save(&purchase).await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

// ============================================================================
// Place
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_decrements_stock_and_stamps_purchase() {
    let pool = test_pool().await;
    let tea = stocked_product(&pool, 450, 5).await;
    let mug = stocked_product(&pool, 1200, 2).await;

    let mut purchase = Purchase::new();
    purchase.add_product(tea.clone(), 3);
    purchase.add_product(mug.clone(), 2);

    let outcome = PurchaseRepository::new(&pool).place(&purchase).await.unwrap();

    let PlaceOutcome::Placed(placed) = outcome else {
        panic!("expected the order to be placed");
    };
    assert!(placed.is_placed());
    assert_eq!(stock(&pool, tea.id).await, 2);
    assert_eq!(stock(&pool, mug.id).await, 0);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_shortfall_rolls_back_every_line() {
    let pool = test_pool().await;
    let tea = stocked_product(&pool, 450, 5).await;
    let infuser = stocked_product(&pool, 199, 1).await;

    let mut purchase = Purchase::new();
    purchase.add_product(tea.clone(), 2);
    purchase.add_product(infuser.clone(), 3);

    let outcome = PurchaseRepository::new(&pool).place(&purchase).await.unwrap();

    let PlaceOutcome::Unavailable(err) = outcome else {
        panic!("expected a stock shortfall");
    };
    assert_eq!(err.product_id, infuser.id);
    assert_eq!(err.requested, 3);
    assert_eq!(err.available, 1);

    // The first line's decrement was rolled back with the transaction.
    assert_eq!(stock(&pool, tea.id).await, 5);
    assert_eq!(stock(&pool, infuser.id).await, 1);

    let written_lines: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM shop.product_purchase WHERE product_id = $1")
            .bind(tea.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(written_lines, 0);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_concurrent_checkouts_cannot_oversell() {
    let pool = test_pool().await;
    let last_one = stocked_product(&pool, 2995, 1).await;

    let mut first = Purchase::new();
    first.add_product(last_one.clone(), 1);
    let second = first.clone();

    let first_repository = PurchaseRepository::new(&pool);
    let second_repository = PurchaseRepository::new(&pool);
    let (first_outcome, second_outcome) = tokio::join!(
        first_repository.place(&first),
        second_repository.place(&second),
    );

    let outcomes = [first_outcome.unwrap(), second_outcome.unwrap()];
    let placed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, PlaceOutcome::Placed(_)))
        .count();
    let unavailable = outcomes
        .iter()
        .filter(|outcome| {
            matches!(outcome, PlaceOutcome::Unavailable(err) if err.available == 0)
        })
        .count();

    assert_eq!(placed, 1);
    assert_eq!(unavailable, 1);
    assert_eq!(stock(&pool, last_one.id).await, 0);
}
