//! `PostgreSQL`-backed purchase service.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use acme_shop_core::Purchase;

use super::{PurchaseService, ServiceError};
use crate::db::{PlaceOutcome, PurchaseRepository};

/// Purchase service writing to the `shop.purchase` tables.
#[derive(Clone)]
pub struct PgPurchaseService {
    pool: PgPool,
}

impl PgPurchaseService {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseService for PgPurchaseService {
    #[instrument(skip_all, fields(purchase_id = ?purchase.id))]
    async fn save(&self, purchase: Purchase) -> Result<Purchase, ServiceError> {
        Ok(PurchaseRepository::new(&self.pool).save(&purchase).await?)
    }

    #[instrument(skip_all, fields(purchase_id = ?purchase.id))]
    async fn place_order(&self, purchase: Purchase) -> Result<Purchase, ServiceError> {
        match PurchaseRepository::new(&self.pool).place(&purchase).await? {
            PlaceOutcome::Placed(placed) => {
                tracing::info!(purchase_id = ?placed.id, "Order placed");
                Ok(placed)
            }
            PlaceOutcome::Unavailable(err) => Err(err.into()),
        }
    }
}
