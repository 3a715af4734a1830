//! Core types for Tannery.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod role;
pub mod status;
pub mod username;

pub use category::{CategoryError, ProductCategory};
pub use id::*;
pub use role::UserRole;
pub use status::OrderStatus;
pub use username::{Username, UsernameError};
