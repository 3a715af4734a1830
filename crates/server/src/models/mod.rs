//! Domain types for the storefront.
//!
//! These types represent validated domain objects separate from database row
//! types; the row-to-domain conversions live next to the queries in
//! [`crate::db`].

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartItem, CartLine};
pub use order::{Order, OrderDraft, OrderLine, OrderLineDraft, PlacedOrder};
pub use product::{NewProduct, Product, ProductUpdate};
pub use session::{CurrentUser, session_keys};
pub use user::User;
