//! Order service.
//!
//! Converts a non-empty cart into an immutable order. Prices are read live
//! from the catalog at checkout time and copied onto each order line, so a
//! later catalog edit never changes what a historical order cost. The
//! persistence step is a single transaction: order, lines, and the cart
//! delete commit together or not at all.

use rust_decimal::Decimal;
use thiserror::Error;

use tannery_core::{OrderStatus, UserId};

use crate::db::{Store, StoreError};
use crate::models::{Order, OrderDraft, OrderLineDraft, PlacedOrder};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout attempted with no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Store/database error. The cart is left unchanged when this happens
    /// during checkout; callers may retry.
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

/// Order operations over a [`Store`].
#[derive(Debug)]
pub struct OrderService<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> OrderService<'a, S> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Convert the user's cart into an order.
    ///
    /// Reads the cart joined with live catalog prices, computes
    /// `line_total = price * quantity` per line and their sum as the order
    /// total, then persists the order, its lines, and the cart delete as one
    /// transaction. On any failure the cart is exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] if the cart has no lines, either
    /// on the initial read or because a concurrent checkout emptied it
    /// before this one committed.
    pub async fn checkout(&self, user_id: UserId) -> Result<PlacedOrder, OrderError> {
        let lines = self.store.cart_lines(user_id).await?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut total = Decimal::ZERO;
        let mut draft_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            // Snapshot the price the catalog holds right now.
            let price = line.product.price;
            total += price * Decimal::from(line.item.quantity);
            draft_lines.push(OrderLineDraft {
                product_id: line.product.id,
                quantity: line.item.quantity,
                price,
            });
        }

        let draft = OrderDraft {
            user_id,
            total,
            status: OrderStatus::Pending,
            lines: draft_lines,
        };

        let placed = match self.store.create_order(&draft).await {
            Ok(placed) => placed,
            // The cart was emptied between our read and the transaction's
            // delete; the order was rolled back.
            Err(StoreError::NotFound) => return Err(OrderError::EmptyCart),
            Err(e) => return Err(OrderError::Store(e)),
        };

        tracing::info!(
            user = %user_id,
            order = %placed.order.id,
            total = %placed.order.total,
            lines = placed.lines.len(),
            "order placed"
        );
        Ok(placed)
    }

    /// All orders placed by the user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the store operation fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.orders(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tannery_core::{ProductCategory, ProductId};

    use super::*;
    use crate::db::MemStore;
    use crate::models::NewProduct;
    use crate::services::cart::CartService;

    async fn seed_product(store: &MemStore, name: &str, price: Decimal) -> ProductId {
        store
            .insert_product(&NewProduct {
                name: name.to_owned(),
                description: format!("{name} description"),
                category: ProductCategory::Accessories,
                price,
                image_url: format!("https://img.example/{name}.jpg"),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_fails_without_creating_an_order() {
        let store = MemStore::new();
        let orders = OrderService::new(&store);
        let user = UserId::new(1);

        assert!(matches!(
            orders.checkout(user).await,
            Err(OrderError::EmptyCart)
        ));
        assert!(orders.list(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_totals_and_clears_the_cart() {
        let store = MemStore::new();
        let cart = CartService::new(&store);
        let orders = OrderService::new(&store);
        let user = UserId::new(1);

        let jacket = seed_product(&store, "jacket", Decimal::new(4999, 2)).await;
        let wallet = seed_product(&store, "wallet", Decimal::new(1000, 2)).await;
        cart.add_item(user, jacket, 2).await.unwrap();
        cart.add_item(user, wallet, 1).await.unwrap();

        let placed = orders.checkout(user).await.unwrap();

        assert_eq!(placed.order.total, Decimal::new(10998, 2));
        assert_eq!(placed.lines.len(), 2);
        assert!(cart.items(user).await.unwrap().is_empty());
        assert_eq!(orders.list(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_total_equals_sum_of_line_totals() {
        let store = MemStore::new();
        let cart = CartService::new(&store);
        let orders = OrderService::new(&store);
        let user = UserId::new(1);

        let bag = seed_product(&store, "bag", Decimal::new(15999, 2)).await;
        let belt = seed_product(&store, "belt", Decimal::new(3999, 2)).await;
        cart.add_item(user, bag, 3).await.unwrap();
        cart.add_item(user, belt, 2).await.unwrap();

        let placed = orders.checkout(user).await.unwrap();

        let sum: Decimal = placed
            .lines
            .iter()
            .map(|l| l.price * Decimal::from(l.quantity))
            .sum();
        assert_eq!(placed.order.total, sum);
    }

    #[tokio::test]
    async fn order_prices_survive_later_catalog_changes() {
        let store = MemStore::new();
        let cart = CartService::new(&store);
        let orders = OrderService::new(&store);
        let user = UserId::new(1);

        let wallet = seed_product(&store, "wallet", Decimal::new(4999, 2)).await;
        cart.add_item(user, wallet, 1).await.unwrap();
        let placed = orders.checkout(user).await.unwrap();

        // Reprice and then delete the product entirely.
        store
            .update_product(
                wallet,
                &crate::models::ProductUpdate {
                    price: Some(Decimal::new(9999, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.delete_product(wallet).await.unwrap();

        let line = placed.lines.first().unwrap();
        assert_eq!(line.price, Decimal::new(4999, 2));
        assert_eq!(placed.order.total, Decimal::new(4999, 2));
    }

    #[tokio::test]
    async fn checkout_uses_current_price_not_the_price_at_add_time() {
        let store = MemStore::new();
        let cart = CartService::new(&store);
        let orders = OrderService::new(&store);
        let user = UserId::new(1);

        let belt = seed_product(&store, "belt", Decimal::new(3999, 2)).await;
        cart.add_item(user, belt, 1).await.unwrap();

        // Price changes while the item sits in the cart.
        store
            .update_product(
                belt,
                &crate::models::ProductUpdate {
                    price: Some(Decimal::new(4500, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let placed = orders.checkout(user).await.unwrap();
        assert_eq!(placed.order.total, Decimal::new(4500, 2));
    }
}
