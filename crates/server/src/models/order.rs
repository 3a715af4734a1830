//! Order domain types.
//!
//! Orders are immutable once created: each line carries the price copied
//! from the catalog at checkout time, so later catalog edits never change
//! what a historical order cost.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tannery_core::{OrderId, OrderLineId, OrderStatus, ProductId, UserId};

/// An order header.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// Sum of `price * quantity` over the order's lines, fixed at creation.
    pub total: Decimal,
    /// Always created as [`OrderStatus::Pending`].
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One line of an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Unique order line ID.
    pub id: OrderLineId,
    /// Parent order.
    pub order_id: OrderId,
    /// Referenced product (weak reference; the product may later change or
    /// disappear without affecting this line).
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i32,
    /// Unit price at the moment the order was created.
    pub price: Decimal,
}

/// A freshly created order together with its lines.
///
/// Returned by checkout so callers get the full record without a second
/// read.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Everything the store needs to persist an order atomically.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub total: Decimal,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineDraft>,
}

/// One not-yet-persisted order line with its snapshot price.
#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}
