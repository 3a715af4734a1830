//! Seed the catalog with sample products.
//!
//! Inserts a small set of leather goods when the catalog is empty; a
//! non-empty catalog is left untouched so the command is safe to re-run.

use rust_decimal::Decimal;
use tracing::info;

use tannery_core::ProductCategory;
use tannery_server::db::{PgStore, Store, create_pool};
use tannery_server::models::NewProduct;

use super::database_url;

fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Classic Leather Jacket".to_owned(),
            description: "Premium full-grain leather jacket with vintage finish.".to_owned(),
            category: ProductCategory::Jackets,
            price: Decimal::new(29999, 2),
            image_url: "https://placehold.co/600x400/5D4037/FFFFFF?text=Classic+Leather+Jacket"
                .to_owned(),
        },
        NewProduct {
            name: "Slim Bifold Wallet".to_owned(),
            description: "Minimalist leather wallet with RFID protection.".to_owned(),
            category: ProductCategory::Wallets,
            price: Decimal::new(4999, 2),
            image_url: "https://placehold.co/600x400/8D6E63/FFFFFF?text=Slim+Wallet".to_owned(),
        },
        NewProduct {
            name: "Leather Messenger Bag".to_owned(),
            description: "Durable laptop bag for professionals.".to_owned(),
            category: ProductCategory::Bags,
            price: Decimal::new(15999, 2),
            image_url: "https://placehold.co/600x400/4E342E/FFFFFF?text=Messenger+Bag".to_owned(),
        },
        NewProduct {
            name: "Vintage Belt".to_owned(),
            description: "Handcrafted leather belt with brass buckle.".to_owned(),
            category: ProductCategory::Accessories,
            price: Decimal::new(3999, 2),
            image_url: "https://placehold.co/600x400/A1887F/FFFFFF?text=Vintage+Belt".to_owned(),
        },
    ]
}

/// Insert the sample catalog if no products exist yet.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a store operation
/// fails.
pub async fn products() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    let pool = create_pool(&database_url).await?;
    let store = PgStore::new(pool);

    let existing = store.products(None).await?;
    if !existing.is_empty() {
        info!(count = existing.len(), "Catalog already seeded, skipping");
        return Ok(());
    }

    info!("Seeding catalog...");
    for input in sample_products() {
        let product = store.insert_product(&input).await?;
        info!(id = %product.id, name = %product.name, "Seeded product");
    }
    info!("Seeding complete");

    Ok(())
}
