//! Cart service.
//!
//! Per-user cart mutation and reads. The central rule is the merge
//! invariant: a cart holds at most one row per (user, product) pair, and
//! adding an already carted product increments that row instead of creating
//! another. Quantities are validated before any store access; no operation
//! partially updates an item.

use thiserror::Error;

use tannery_core::{CartItemId, ProductId, UserId};

use crate::db::{Store, StoreError};
use crate::models::{CartItem, CartLine};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity was zero or negative where a positive count is required.
    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(i32),

    /// The referenced product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// No cart item with this ID belongs to the caller.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemId),

    /// Store/database error.
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

/// Cart operations over a [`Store`].
#[derive(Debug)]
pub struct CartService<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> CartService<'a, S> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Add `quantity` units of a product to the user's cart.
    ///
    /// If the product is already in the cart, the existing row's quantity is
    /// incremented (merge semantics); otherwise a row is created. The
    /// product is resolved against the live catalog first.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity < 1`.
    /// Returns [`CartError::ProductNotFound`] if the product does not exist.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let item = self
            .store
            .upsert_cart_item(user_id, product.id, quantity)
            .await?;

        tracing::debug!(user = %user_id, product = %product.id, quantity, "added to cart");
        Ok(item)
    }

    /// Set an item's quantity directly (not additive).
    ///
    /// A quantity of zero or below removes the item instead; a quantity
    /// that low is never persisted. Returns the updated item, or `None` when
    /// the request resolved to a removal.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no item with this ID belongs
    /// to the caller (removal requests are idempotent and skip this check).
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartItem>, CartError> {
        if quantity <= 0 {
            self.store.remove_cart_item(item_id, user_id).await?;
            return Ok(None);
        }

        let updated = self
            .store
            .set_cart_quantity(item_id, user_id, quantity)
            .await?
            .ok_or(CartError::ItemNotFound(item_id))?;

        Ok(Some(updated))
    }

    /// Remove an item from the user's cart.
    ///
    /// Idempotent: removing an item that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the store operation fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(), CartError> {
        self.store.remove_cart_item(item_id, user_id).await?;
        Ok(())
    }

    /// The user's cart, each row joined with its current catalog entry.
    ///
    /// Prices come from the catalog at this moment, never from a cache.
    /// Rows referencing a deleted product are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the store operation fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartLine>, CartError> {
        Ok(self.store.cart_lines(user_id).await?)
    }

    /// Remove every item from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the store operation fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, CartError> {
        let removed = self.store.clear_cart(user_id).await?;
        tracing::debug!(user = %user_id, removed, "cleared cart");
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use tannery_core::ProductCategory;

    use super::*;
    use crate::db::MemStore;
    use crate::models::NewProduct;

    async fn store_with_product(price: Decimal) -> (MemStore, ProductId) {
        let store = MemStore::new();
        let product = store
            .insert_product(&NewProduct {
                name: "Vintage Belt".to_owned(),
                description: "Handcrafted leather belt with brass buckle.".to_owned(),
                category: ProductCategory::Accessories,
                price,
                image_url: "https://img.example/belt.jpg".to_owned(),
            })
            .await
            .unwrap();
        (store, product.id)
    }

    #[tokio::test]
    async fn add_merges_repeat_products() {
        let (store, product_id) = store_with_product(Decimal::new(3999, 2)).await;
        let cart = CartService::new(&store);
        let user = UserId::new(1);

        cart.add_item(user, product_id, 2).await.unwrap();
        let merged = cart.add_item(user, product_id, 3).await.unwrap();

        assert_eq!(merged.quantity, 5);
        assert_eq!(cart.items(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_rejects_non_positive_quantity() {
        let (store, product_id) = store_with_product(Decimal::ONE).await;
        let cart = CartService::new(&store);

        for quantity in [0, -1] {
            let err = cart
                .add_item(UserId::new(1), product_id, quantity)
                .await
                .unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity(q) if q == quantity));
        }
    }

    #[tokio::test]
    async fn add_rejects_unknown_product() {
        let store = MemStore::new();
        let cart = CartService::new(&store);

        let err = cart
            .add_item(UserId::new(1), ProductId::new(404), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn update_to_zero_removes_the_item() {
        let (store, product_id) = store_with_product(Decimal::ONE).await;
        let cart = CartService::new(&store);
        let user = UserId::new(1);
        let item = cart.add_item(user, product_id, 2).await.unwrap();

        let result = cart.update_quantity(user, item.id, 0).await.unwrap();

        assert!(result.is_none());
        assert!(cart.items(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_sets_quantity_directly() {
        let (store, product_id) = store_with_product(Decimal::ONE).await;
        let cart = CartService::new(&store);
        let user = UserId::new(1);
        let item = cart.add_item(user, product_id, 2).await.unwrap();

        let updated = cart.update_quantity(user, item.id, 7).await.unwrap();

        assert_eq!(updated.unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn update_rejects_items_owned_by_someone_else() {
        let (store, product_id) = store_with_product(Decimal::ONE).await;
        let cart = CartService::new(&store);
        let item = cart.add_item(UserId::new(1), product_id, 1).await.unwrap();

        let err = cart
            .update_quantity(UserId::new(2), item.id, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (store, product_id) = store_with_product(Decimal::ONE).await;
        let cart = CartService::new(&store);
        let user = UserId::new(1);
        let item = cart.add_item(user, product_id, 1).await.unwrap();

        cart.remove_item(user, item.id).await.unwrap();
        // Second removal of the same item is not an error.
        cart.remove_item(user, item.id).await.unwrap();
    }

    #[tokio::test]
    async fn clear_empties_only_this_users_cart() {
        let (store, product_id) = store_with_product(Decimal::ONE).await;
        let cart = CartService::new(&store);

        cart.add_item(UserId::new(1), product_id, 1).await.unwrap();
        cart.add_item(UserId::new(2), product_id, 4).await.unwrap();

        assert_eq!(cart.clear(UserId::new(1)).await.unwrap(), 1);
        assert!(cart.items(UserId::new(1)).await.unwrap().is_empty());
        assert_eq!(cart.items(UserId::new(2)).await.unwrap().len(), 1);
    }
}
