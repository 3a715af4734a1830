//! Business services.
//!
//! Each service wraps the [`crate::db::Store`] seam with the validation and
//! orchestration rules of its operation set. Identity is always an explicit
//! argument; nothing in this layer reads ambient session state.

pub mod auth;
pub mod cart;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use orders::{OrderError, OrderService};
