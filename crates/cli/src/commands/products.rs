//! Catalog inspection commands.

use acme_shop_storefront::services::{PgProductService, ProductService};

use super::{CliError, connect};

/// Print every product with its price and stock on hand.
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let products = PgProductService::new(pool).find_all().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:>6}  {:<32} {:>10} {:>6}", "ID", "NAME", "PRICE", "STOCK");
        for product in &products {
            println!(
                "{:>6}  {:<32} {:>10} {:>6}",
                product.id.to_string(),
                product.name,
                product.price.to_string(),
                product.quantity
            );
        }
        println!("{} products", products.len());
    }

    Ok(())
}
