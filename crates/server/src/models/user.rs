//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tannery_core::{UserId, UserRole, Username};

/// A storefront account.
///
/// The password hash never leaves the database layer; this type is safe to
/// serialize in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Role used by the access gate.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
