//! Purchase repository: cart persistence and order placement.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use acme_shop_core::{AvailabilityError, ProductPurchase, ProductPurchaseId, Purchase, PurchaseId};

use super::products::{current_stock, decrement_stock};
use super::{RepositoryError, to_db_quantity};

/// Result of trying to place a purchase as an order.
#[derive(Debug)]
pub enum PlaceOutcome {
    /// Stock was reserved and the purchase stamped as placed.
    Placed(Purchase),
    /// A line asked for more than is in stock; nothing was written.
    Unavailable(AvailabilityError),
}

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a purchase and its lines, returning it with IDs assigned.
    ///
    /// Lines are rewritten on every save, so line IDs are only stable
    /// between saves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the purchase has an ID that no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn save(&self, purchase: &Purchase) -> Result<Purchase, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let saved = write_purchase(&mut tx, purchase).await?;
        tx.commit().await?;

        Ok(saved)
    }

    /// Reserve stock for every line and mark the purchase as placed.
    ///
    /// Runs in one transaction: if any line exceeds the stock on hand, the
    /// transaction is rolled back and the shortfall is reported.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a line references a deleted product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn place(&self, purchase: &Purchase) -> Result<PlaceOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for line in &purchase.product_purchases {
            let product = &line.product;
            if decrement_stock(&mut tx, product.id, line.quantity).await? {
                continue;
            }

            let available = current_stock(&mut tx, product.id)
                .await?
                .ok_or(RepositoryError::NotFound)?;

            return Ok(PlaceOutcome::Unavailable(shortfall(line, available)));
        }

        let mut placed = write_purchase(&mut tx, purchase).await?;
        let purchase_id = placed.id.ok_or(RepositoryError::NotFound)?;

        let placed_at: DateTime<Utc> = sqlx::query_scalar(
            r"
            UPDATE shop.purchase
            SET placed_at = now(), updated_at = now()
            WHERE id = $1
            RETURNING placed_at
            ",
        )
        .bind(purchase_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        placed.placed_at = Some(placed_at);
        Ok(PlaceOutcome::Placed(placed))
    }
}

/// Describe a line that could not be reserved against `available` units.
fn shortfall(line: &ProductPurchase, available: u32) -> AvailabilityError {
    AvailabilityError {
        product_id: line.product.id,
        product_name: line.product.name.clone(),
        requested: line.quantity,
        available,
    }
}

/// Write the purchase header and replace its lines.
async fn write_purchase(
    conn: &mut PgConnection,
    purchase: &Purchase,
) -> Result<Purchase, RepositoryError> {
    let purchase_id = match purchase.id {
        Some(id) => {
            let result = sqlx::query("UPDATE shop.purchase SET updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(&mut *conn)
                .await?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            id
        }
        None => {
            sqlx::query_scalar::<_, PurchaseId>(
                "INSERT INTO shop.purchase DEFAULT VALUES RETURNING id",
            )
            .fetch_one(&mut *conn)
            .await?
        }
    };

    sqlx::query("DELETE FROM shop.product_purchase WHERE purchase_id = $1")
        .bind(purchase_id)
        .execute(&mut *conn)
        .await?;

    let mut lines = Vec::with_capacity(purchase.product_purchases.len());
    for (position, line) in (0i32..).zip(&purchase.product_purchases) {
        let line_id: ProductPurchaseId = sqlx::query_scalar(
            r"
            INSERT INTO shop.product_purchase (purchase_id, product_id, quantity, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(purchase_id)
        .bind(line.product.id)
        .bind(to_db_quantity(line.quantity)?)
        .bind(position)
        .fetch_one(&mut *conn)
        .await?;

        lines.push(ProductPurchase {
            id: Some(line_id),
            quantity: line.quantity,
            product: line.product.clone(),
        });
    }

    Ok(Purchase {
        id: Some(purchase_id),
        product_purchases: lines,
        placed_at: purchase.placed_at,
    })
}

#[cfg(test)]
mod tests {
    use acme_shop_core::{Price, Product, ProductId};

    use super::*;

    #[test]
    fn test_shortfall_reports_current_stock() {
        let line = ProductPurchase::new(
            Product {
                id: ProductId::new(2),
                name: "Tea Infuser".to_string(),
                description: String::new(),
                price: Price::from_cents(199),
                quantity: 3,
                full_image_name: None,
                thumb_image_name: None,
            },
            3,
        );

        let err = shortfall(&line, 1);

        assert_eq!(err.product_id, ProductId::new(2));
        assert_eq!(err.requested, 3);
        assert_eq!(err.available, 1);
        assert_eq!(
            err.to_string(),
            "Unable to make 3 order/s of Tea Infuser: only 1 available"
        );
    }
}
