//! Integration test harness for the Acme Shop storefront.
//!
//! [`TestContext`] drives the real storefront router in process with
//! `tower::ServiceExt::oneshot`. Sessions live in a `MemoryStore` and the
//! catalog and purchase services are replaced by [`InMemoryShop`], so the
//! tests need no database.
//!
//! ```rust,ignore
//! let mut ctx = TestContext::new(vec![product(1, "Tea", 450, 5)]);
//! let response = ctx.post_form("/cart/add", "productId=1&quantity=2").await;
//! assert_eq!(response.location(), Some("/product/"));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use acme_shop_core::{
    Page, PageRequest, Price, Product, ProductId, ProductPurchaseId, Purchase, PurchaseId,
};
use acme_shop_storefront::config::{SentryConfig, StorefrontConfig};
use acme_shop_storefront::middleware::create_session_layer;
use acme_shop_storefront::routes;
use acme_shop_storefront::services::{ProductService, PurchaseService, ServiceError};
use acme_shop_storefront::state::AppState;

// =============================================================================
// Fixtures
// =============================================================================

/// Build a catalog product.
#[must_use]
pub fn product(id: i64, name: &str, cents: i64, quantity: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: format!("{name} description"),
        price: Price::from_cents(cents),
        quantity,
        full_image_name: None,
        thumb_image_name: None,
    }
}

/// Storefront configuration suitable for in-process tests.
#[must_use]
pub fn test_config(page_size: u32) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:8080".to_owned(),
        page_size,
        sentry: SentryConfig::default(),
    }
}

// =============================================================================
// In-memory services
// =============================================================================

#[derive(Default)]
struct ShopData {
    products: BTreeMap<ProductId, Product>,
    purchases: BTreeMap<PurchaseId, Purchase>,
    next_purchase_id: i64,
    next_line_id: i64,
}

/// In-memory catalog and purchase store implementing both service traits.
#[derive(Default)]
pub struct InMemoryShop {
    data: Mutex<ShopData>,
}

impl InMemoryShop {
    /// Create a shop stocked with `products`.
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let shop = Self::default();
        for product in products {
            shop.put_product(product);
        }
        shop
    }

    fn data(&self) -> MutexGuard<'_, ShopData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a catalog product.
    pub fn put_product(&self, product: Product) {
        self.data().products.insert(product.id, product);
    }

    /// Current stock for a product, if it exists.
    #[must_use]
    pub fn stock(&self, id: i64) -> Option<u32> {
        self.data()
            .products
            .get(&ProductId::new(id))
            .map(|product| product.quantity)
    }

    /// Overwrite the stock for a product.
    pub fn set_stock(&self, id: i64, quantity: u32) {
        if let Some(product) = self.data().products.get_mut(&ProductId::new(id)) {
            product.quantity = quantity;
        }
    }

    /// Every stored purchase, ordered by ID.
    #[must_use]
    pub fn purchases(&self) -> Vec<Purchase> {
        self.data().purchases.values().cloned().collect()
    }
}

#[async_trait]
impl ProductService for InMemoryShop {
    async fn find_all(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.data().products.values().cloned().collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Product>, ServiceError> {
        let data = self.data();
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size()).unwrap_or(usize::MAX);
        let items = data
            .products
            .values()
            .skip(offset)
            .take(size)
            .cloned()
            .collect();
        let total = u64::try_from(data.products.len()).unwrap_or(u64::MAX);
        Ok(Page::new(items, request, total))
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        Ok(self.data().products.get(&id).cloned())
    }
}

#[async_trait]
impl PurchaseService for InMemoryShop {
    async fn save(&self, mut purchase: Purchase) -> Result<Purchase, ServiceError> {
        let mut data = self.data();
        let id = if let Some(id) = purchase.id {
            id
        } else {
            data.next_purchase_id += 1;
            PurchaseId::new(data.next_purchase_id)
        };
        purchase.id = Some(id);
        for line in &mut purchase.product_purchases {
            data.next_line_id += 1;
            line.id = Some(ProductPurchaseId::new(data.next_line_id));
        }
        data.purchases.insert(id, purchase.clone());
        Ok(purchase)
    }

    async fn place_order(&self, purchase: Purchase) -> Result<Purchase, ServiceError> {
        {
            let mut data = self.data();
            for line in &purchase.product_purchases {
                let current = data.products.get(&line.product.id).unwrap_or(&line.product);
                current.check_quantity(line.quantity)?;
            }
            for line in &purchase.product_purchases {
                if let Some(product) = data.products.get_mut(&line.product.id) {
                    product.quantity = product.quantity.saturating_sub(line.quantity);
                }
            }
        }

        let mut placed = self.save(purchase).await?;
        placed.placed_at = Some(chrono::Utc::now());
        if let Some(id) = placed.id {
            self.data().purchases.insert(id, placed.clone());
        }
        Ok(placed)
    }
}

// =============================================================================
// Test context
// =============================================================================

/// A response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Redirect target, if this is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether this is a `303 See Other` to `path`.
    #[must_use]
    pub fn redirects_to(&self, path: &str) -> bool {
        self.status == StatusCode::SEE_OTHER && self.location() == Some(path)
    }
}

/// One shopper's browser: the storefront router plus a session cookie.
pub struct TestContext {
    app: Router,
    shop: Arc<InMemoryShop>,
    cookie: Option<String>,
}

impl TestContext {
    /// Storefront over `products` with the default page size.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_page_size(products, 12)
    }

    /// Storefront over `products` showing `page_size` products per page.
    #[must_use]
    pub fn with_page_size(products: Vec<Product>, page_size: u32) -> Self {
        let config = test_config(page_size);
        let shop = Arc::new(InMemoryShop::new(products));
        let state = AppState::new(config.clone(), shop.clone(), shop.clone());

        let app = routes::routes()
            .layer(create_session_layer(MemoryStore::default(), &config))
            .with_state(state);

        Self {
            app,
            shop,
            cookie: None,
        }
    }

    /// A second shopper on the same storefront: shared router, services and
    /// session store, but no session cookie yet.
    #[must_use]
    pub fn new_session(&self) -> Self {
        Self {
            app: self.app.clone(),
            shop: Arc::clone(&self.shop),
            cookie: None,
        }
    }

    /// The in-memory services behind the router.
    #[must_use]
    pub fn shop(&self) -> &InMemoryShop {
        &self.shop
    }

    /// Send a `GET` request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty());
        self.send(request).await
    }

    /// Send a urlencoded form `POST` request.
    pub async fn post_form(&mut self, path: &str, form: &str) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()));
        self.send(request).await
    }

    /// Follow a redirect response with a `GET`.
    pub async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        let location = response.location().unwrap_or("/").to_owned();
        self.get(&location).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Result<Request<Body>, axum::http::Error>) -> TestResponse {
        let request = request.unwrap_or_else(|e| panic!("invalid test request: {e}"));
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            self.store_cookie(set_cookie);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read response body: {e}"));

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let has_value = pair.split_once('=').is_some_and(|(_, value)| !value.is_empty());
        self.cookie = has_value.then(|| pair.to_owned());
    }
}
