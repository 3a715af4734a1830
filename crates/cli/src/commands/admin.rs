//! Admin account management.
//!
//! The registration endpoint only ever creates `user`-role accounts; admin
//! accounts are bootstrapped here.

use tracing::info;

use tannery_core::{UserRole, Username};
use tannery_server::db::{PgStore, Store, create_pool};
use tannery_server::services::auth::hash_password;

use super::database_url;

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the username is invalid or taken, the password
/// cannot be hashed, or the database is unreachable.
pub async fn create_user(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let username = Username::parse(username)?;
    let password_hash = hash_password(password)?;

    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;
    let store = PgStore::new(pool);

    let user = store
        .create_user(&username, &password_hash, UserRole::Admin)
        .await?;

    info!(id = %user.id, username = %user.username, "Admin account created");
    Ok(())
}
