//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tannery_core::{CartItemId, ProductId, UserId};

use super::product::Product;

/// One cart row: a (user, product, quantity) triple.
///
/// There is exactly one row per (user, product) pair; adding an already
/// carted product merges into the existing row. A persisted quantity is
/// always at least 1.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    /// Unique cart item ID.
    pub id: CartItemId,
    /// Owning user.
    pub user_id: UserId,
    /// Referenced product (weak reference, resolved at read time).
    pub product_id: ProductId,
    /// Units of the product, >= 1.
    pub quantity: i32,
    /// When the row was first created.
    pub created_at: DateTime<Utc>,
}

/// A cart item joined with its live catalog entry.
///
/// Serialized as the item's fields with an embedded `product` object, which
/// is the shape cart reads have always had on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    /// The product as it exists right now; prices here are live, not
    /// snapshots.
    pub product: Product,
}
