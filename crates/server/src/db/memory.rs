//! In-memory [`Store`] implementation.
//!
//! Mirrors the `PostgreSQL` semantics (merge-on-add keyed on the
//! (user, product) pair, ownership-scoped updates, all-or-nothing order
//! creation) with every operation applied under a single lock. Used by the
//! test suite to exercise the service layer without a database.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use tannery_core::{
    CartItemId, OrderId, OrderLineId, ProductCategory, ProductId, UserId, UserRole, Username,
};

use super::{Store, StoreError};
use crate::models::{
    CartItem, CartLine, NewProduct, Order, OrderDraft, OrderLine, PlacedOrder, Product,
    ProductUpdate, User,
};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    users: Vec<(User, String)>,
    products: Vec<Product>,
    cart: Vec<CartItem>,
    orders: Vec<Order>,
    order_lines: Vec<OrderLine>,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-operation; recover the data
        // rather than cascading the panic into every later call.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let mut inner = self.lock();

        if inner.users.iter().any(|(u, _)| u.username == *username) {
            return Err(StoreError::Conflict("username already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(inner.next_id()),
            username: username.clone(),
            role,
            created_at: Utc::now(),
        };
        inner.users.push((user.clone(), password_hash.to_owned()));
        Ok(user)
    }

    async fn user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| u.username == *username)
            .cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn products(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let inner = self.lock();
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, input: &NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.lock();
        let product = Product {
            id: ProductId::new(inner.next_id()),
            name: input.name.clone(),
            description: input.description.clone(),
            category: input.category,
            price: input.price,
            image_url: input.image_url.clone(),
            created_at: Utc::now(),
        };
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.lock();
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            product.name = name.clone();
        }
        if let Some(description) = &update.description {
            product.description = description.clone();
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(image_url) = &update.image_url {
            product.image_url = image_url.clone();
        }

        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, StoreError> {
        let mut inner = self.lock();

        if let Some(item) = inner
            .cart
            .iter_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            item.quantity += quantity;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: CartItemId::new(inner.next_id()),
            user_id,
            product_id,
            quantity,
            created_at: Utc::now(),
        };
        inner.cart.push(item.clone());
        Ok(item)
    }

    async fn set_cart_quantity(
        &self,
        item_id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<Option<CartItem>, StoreError> {
        let mut inner = self.lock();
        let Some(item) = inner
            .cart
            .iter_mut()
            .find(|i| i.id == item_id && i.user_id == user_id)
        else {
            return Ok(None);
        };

        item.quantity = quantity;
        Ok(Some(item.clone()))
    }

    async fn remove_cart_item(
        &self,
        item_id: CartItemId,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let before = inner.cart.len();
        inner
            .cart
            .retain(|i| !(i.id == item_id && i.user_id == user_id));
        Ok(inner.cart.len() < before)
    }

    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .cart
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter_map(|item| {
                // Stale rows (product deleted) are excluded, as with the SQL
                // inner join.
                inner
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|product| CartLine {
                        item: item.clone(),
                        product: product.clone(),
                    })
            })
            .collect())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let before = inner.cart.len();
        inner.cart.retain(|i| i.user_id != user_id);
        Ok((before - inner.cart.len()) as u64)
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<PlacedOrder, StoreError> {
        let mut inner = self.lock();

        let before = inner.cart.len();
        inner.cart.retain(|i| i.user_id != draft.user_id);
        if inner.cart.len() == before {
            return Err(StoreError::NotFound);
        }

        let order = Order {
            id: OrderId::new(inner.next_id()),
            user_id: draft.user_id,
            total: draft.total,
            status: draft.status,
            created_at: Utc::now(),
        };

        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            lines.push(OrderLine {
                id: OrderLineId::new(inner.next_id()),
                order_id: order.id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
            });
        }

        inner.orders.push(order.clone());
        inner.order_lines.extend(lines.iter().cloned());

        Ok(PlacedOrder { order, lines })
    }

    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn sample_product(name: &str, price: Decimal) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: format!("{name} description"),
            category: ProductCategory::Accessories,
            price,
            image_url: format!("https://img.example/{name}.jpg"),
        }
    }

    #[tokio::test]
    async fn upsert_merges_into_existing_row() {
        let store = MemStore::new();
        let user = UserId::new(1);
        let product = store
            .insert_product(&sample_product("belt", Decimal::new(3999, 2)))
            .await
            .unwrap();

        store.upsert_cart_item(user, product.id, 2).await.unwrap();
        let merged = store.upsert_cart_item(user, product.id, 3).await.unwrap();

        assert_eq!(merged.quantity, 5);
        let lines = store.cart_lines(user).await.unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn remove_is_scoped_to_owner() {
        let store = MemStore::new();
        let product = store
            .insert_product(&sample_product("wallet", Decimal::new(4999, 2)))
            .await
            .unwrap();
        let item = store
            .upsert_cart_item(UserId::new(1), product.id, 1)
            .await
            .unwrap();

        // Someone else's item ID does not delete ours.
        assert!(!store.remove_cart_item(item.id, UserId::new(2)).await.unwrap());
        assert!(store.remove_cart_item(item.id, UserId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn stale_cart_rows_are_excluded_from_reads() {
        let store = MemStore::new();
        let user = UserId::new(1);
        let product = store
            .insert_product(&sample_product("bag", Decimal::new(15999, 2)))
            .await
            .unwrap();
        store.upsert_cart_item(user, product.id, 1).await.unwrap();

        store.delete_product(product.id).await.unwrap();

        assert!(store.cart_lines(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_order_on_empty_cart_persists_nothing() {
        let store = MemStore::new();
        let draft = OrderDraft {
            user_id: UserId::new(1),
            total: Decimal::ZERO,
            status: tannery_core::OrderStatus::Pending,
            lines: Vec::new(),
        };

        assert!(matches!(
            store.create_order(&draft).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.orders(UserId::new(1)).await.unwrap().is_empty());
    }
}
