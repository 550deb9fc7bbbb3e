//! Seed the catalog from a YAML file.
//!
//! The file is a list of products. Prices are decimal strings; products are
//! matched by name, so re-running a seed updates price and stock in place.
//!
//! ```yaml
//! - name: Green Tea
//!   description: Loose leaf sencha
//!   price: "4.50"
//!   quantity: 25
//!   thumb_image_name: green-tea-thumb.png
//! ```

use std::path::Path;

use tracing::info;

use acme_shop_storefront::db::{NewProduct, ProductRepository};

use super::{CliError, connect};

/// Parse a product seed document.
fn parse_products(content: &str) -> Result<Vec<NewProduct>, CliError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Insert or update every product listed in `file_path`.
///
/// The file is parsed before connecting, so a malformed file never touches
/// the database.
pub async fn products(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let products = parse_products(&content)?;
    info!(count = products.len(), "Parsed seed file");

    let pool = connect().await?;
    let repository = ProductRepository::new(&pool);

    for product in &products {
        let saved = repository.upsert(product).await?;
        info!(id = %saved.id, name = %saved.name, quantity = saved.quantity, "Seeded product");
    }

    info!("Seeding complete! {} products written", products.len());
    Ok(())
}
