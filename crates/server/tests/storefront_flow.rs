//! End-to-end exercises of the cart and order services over the in-memory
//! store: the merge invariant, quantity rules, checkout atomicity, and
//! price snapshotting.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use tannery_core::{ProductCategory, ProductId, UserId};
use tannery_server::db::{MemStore, Store};
use tannery_server::models::{NewProduct, ProductUpdate};
use tannery_server::services::{AuthService, CartService, OrderError, OrderService};

async fn seed_product(store: &MemStore, name: &str, cents: i64) -> ProductId {
    store
        .insert_product(&NewProduct {
            name: name.to_owned(),
            description: format!("{name} description"),
            category: ProductCategory::Accessories,
            price: Decimal::new(cents, 2),
            image_url: format!("https://img.example/{name}.jpg"),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn adding_the_same_product_twice_merges_quantities() {
    let store = MemStore::new();
    let cart = CartService::new(&store);
    let user = UserId::new(1);
    let product = seed_product(&store, "jacket", 29999).await;

    cart.add_item(user, product, 2).await.unwrap();
    cart.add_item(user, product, 3).await.unwrap();

    let lines = cart.items(user).await.unwrap();
    assert_eq!(lines.len(), 1, "merge must never duplicate rows");
    assert_eq!(lines.first().unwrap().item.quantity, 5);
}

#[tokio::test]
async fn no_persisted_quantity_is_ever_below_one() {
    let store = MemStore::new();
    let cart = CartService::new(&store);
    let user = UserId::new(1);
    let product = seed_product(&store, "belt", 3999).await;

    // Invalid adds never reach the store.
    assert!(cart.add_item(user, product, 0).await.is_err());
    assert!(cart.add_item(user, product, -3).await.is_err());

    // An update to zero removes the row rather than persisting it.
    let item = cart.add_item(user, product, 2).await.unwrap();
    cart.update_quantity(user, item.id, 0).await.unwrap();

    for line in cart.items(user).await.unwrap() {
        assert!(line.item.quantity >= 1);
    }
    assert!(cart.items(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_totals_are_price_times_quantity_summed() {
    let store = MemStore::new();
    let cart = CartService::new(&store);
    let orders = OrderService::new(&store);
    let user = UserId::new(1);

    // {p=10 (price 49.99, qty 2), p=20 (price 10.00, qty 1)} => 109.98
    let first = seed_product(&store, "wallet", 4999).await;
    let second = seed_product(&store, "care-kit", 1000).await;
    cart.add_item(user, first, 2).await.unwrap();
    cart.add_item(user, second, 1).await.unwrap();

    let placed = orders.checkout(user).await.unwrap();

    assert_eq!(placed.order.total, Decimal::new(10998, 2));
    assert_eq!(placed.lines.len(), 2);
    assert!(cart.items(user).await.unwrap().is_empty());

    let history = orders.list(user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.first().unwrap().total, placed.order.total);
}

#[tokio::test]
async fn empty_cart_checkout_creates_no_order() {
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
async fn second_checkout_of_the_same_cart_is_empty_cart() {
    let store = MemStore::new();
    let cart = CartService::new(&store);
    let orders = OrderService::new(&store);
    let user = UserId::new(1);
    let product = seed_product(&store, "bag", 15999).await;
    cart.add_item(user, product, 1).await.unwrap();

    orders.checkout(user).await.unwrap();
    assert!(matches!(
        orders.checkout(user).await,
        Err(OrderError::EmptyCart)
    ));
    assert_eq!(orders.list(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn order_prices_are_snapshots_not_references() {
    let store = MemStore::new();
    let cart = CartService::new(&store);
    let orders = OrderService::new(&store);
    let user = UserId::new(1);
    let product = seed_product(&store, "jacket", 29999).await;
    cart.add_item(user, product, 1).await.unwrap();

    let placed = orders.checkout(user).await.unwrap();

    store
        .update_product(
            product,
            &ProductUpdate {
                price: Some(Decimal::new(100, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(placed.lines.first().unwrap().price, Decimal::new(29999, 2));
    assert_eq!(
        orders.list(user).await.unwrap().first().unwrap().total,
        Decimal::new(29999, 2)
    );
}

#[tokio::test]
async fn carts_are_isolated_per_user() {
    let store = MemStore::new();
    let cart = CartService::new(&store);
    let orders = OrderService::new(&store);
    let product = seed_product(&store, "belt", 3999).await;

    let alice = UserId::new(1);
    let bob = UserId::new(2);
    cart.add_item(alice, product, 1).await.unwrap();
    cart.add_item(bob, product, 5).await.unwrap();

    orders.checkout(alice).await.unwrap();

    // Alice's checkout must not have touched Bob's cart.
    let bobs = cart.items(bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs.first().unwrap().item.quantity, 5);
    assert!(orders.list(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn registered_users_can_shop_end_to_end() {
    let store = MemStore::new();
    let auth = AuthService::new(&store);
    let cart = CartService::new(&store);
    let orders = OrderService::new(&store);

    let user = auth.register("ada.lovelace", "correct-horse-battery").await.unwrap();
    let product = seed_product(&store, "wallet", 4999).await;

    cart.add_item(user.id, product, 2).await.unwrap();
    let placed = orders.checkout(user.id).await.unwrap();

    assert_eq!(placed.order.user_id, user.id);
    assert_eq!(placed.order.total, Decimal::new(9998, 2));
}
