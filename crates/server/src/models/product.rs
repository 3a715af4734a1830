//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tannery_core::{ProductCategory, ProductId};

/// A catalog entry.
///
/// Prices are fixed-point decimals and serialize as strings on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Catalog category.
    pub category: ProductCategory,
    /// Unit price, non-negative.
    pub price: Decimal,
    /// Image reference.
    pub image_url: String,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub image_url: String,
}

/// Partial update for an existing product.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}
