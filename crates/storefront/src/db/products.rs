//! Product repository for catalog queries and stock updates.

use serde::Deserialize;
use sqlx::{FromRow, PgConnection, PgPool};

use acme_shop_core::{Price, Product, ProductId};

use super::{RepositoryError, from_db_quantity, to_db_quantity};

/// Row shape of `shop.product`.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    quantity: i32,
    full_image_name: Option<String>,
    thumb_image_name: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: from_db_quantity(row.quantity)?,
            full_image_name: row.full_image_name,
            thumb_image_name: row.thumb_image_name,
        })
    }
}

/// A catalog entry to insert or refresh, as read from a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub full_image_name: Option<String>,
    #[serde(default)]
    pub thumb_image_name: Option<String>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, quantity, full_image_name, thumb_image_name
            FROM shop.product
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// List one page of products ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_page(&self, limit: u32, offset: u64) -> Result<Vec<Product>, RepositoryError> {
        let offset = i64::try_from(offset)
            .map_err(|_| RepositoryError::InvalidInput(format!("offset {offset} is too large")))?;

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, quantity, full_image_name, thumb_image_name
            FROM shop.product
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {count}")))
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, quantity, full_image_name, thumb_image_name
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a product, or refresh the existing product with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if the quantity does not fit the column.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO shop.product
                (name, description, price, quantity, full_image_name, thumb_image_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO UPDATE SET
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                quantity = EXCLUDED.quantity,
                full_image_name = EXCLUDED.full_image_name,
                thumb_image_name = EXCLUDED.thumb_image_name
            RETURNING id, name, description, price, quantity, full_image_name, thumb_image_name
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(to_db_quantity(product.quantity)?)
        .bind(&product.full_image_name)
        .bind(&product.thumb_image_name)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }
}

/// Take `quantity` units out of stock inside an open transaction.
///
/// Returns `false` without touching the row when fewer units are in stock,
/// so concurrent checkouts can never drive stock negative.
pub(crate) async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: u32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE shop.product
        SET quantity = quantity - $1
        WHERE id = $2 AND quantity >= $1
        ",
    )
    .bind(to_db_quantity(quantity)?)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Read the current stock of a product inside an open transaction.
pub(crate) async fn current_stock(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<u32>, RepositoryError> {
    let quantity: Option<i32> = sqlx::query_scalar("SELECT quantity FROM shop.product WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    quantity.map(from_db_quantity).transpose()
}
