//! HTTP middleware: the access gate, session plumbing, and request IDs.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdmin, RequireUser};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
