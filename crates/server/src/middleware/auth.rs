//! The access gate: authentication extractors.
//!
//! Every gated handler names one of these extractors, so the identity and
//! role check always runs before the handler body touches the store. Cart
//! and order operations take [`RequireUser`] (any authenticated identity);
//! catalog mutation takes [`RequireAdmin`].

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Rejection returned when the access gate refuses a request.
#[derive(Debug)]
pub enum GateRejection {
    /// No authenticated identity on a gated operation.
    AuthenticationRequired,
    /// Identity present but lacks the required role.
    AuthorizationDenied,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::AuthenticationRequired => (StatusCode::UNAUTHORIZED, "Login required"),
            Self::AuthorizationDenied => (StatusCode::FORBIDDEN, "Admin access required"),
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

/// Read the current user out of the session, if any.
async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Extractor that requires any authenticated identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug)]
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or(GateRejection::AuthenticationRequired)
    }
}

/// Extractor that requires an authenticated identity with the admin role.
///
/// Anonymous requests are rejected with 401; authenticated non-admins with
/// 403.
#[derive(Debug)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or(GateRejection::AuthenticationRequired)?;

        if !user.role.is_admin() {
            return Err(GateRejection::AuthorizationDenied);
        }

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
