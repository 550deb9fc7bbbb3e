//! `PostgreSQL`-backed product service.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use acme_shop_core::{Page, PageRequest, Product, ProductId};

use super::{ProductService, ServiceError};
use crate::db::ProductRepository;

/// Product service reading from the `shop.product` table.
#[derive(Clone)]
pub struct PgProductService {
    pool: PgPool,
}

impl PgProductService {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const fn repository(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.pool)
    }
}

#[async_trait]
impl ProductService for PgProductService {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.repository().list_all().await?)
    }

    #[instrument(skip(self))]
    async fn find_page(&self, request: PageRequest) -> Result<Page<Product>, ServiceError> {
        let repository = self.repository();
        let items = repository
            .list_page(request.size(), request.offset())
            .await?;
        let total = repository.count().await?;

        Ok(Page::new(items, request, total))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        Ok(self.repository().get_by_id(id).await?)
    }
}
