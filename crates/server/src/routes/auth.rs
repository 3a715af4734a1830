//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Credentials for register and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub username: String,
    pub password: String,
}

/// Create an account and log the session in.
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.store());
    let user = auth.register(&body.username, &body.password).await?;

    start_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with username and password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<User>> {
    let auth = AuthService::new(state.store());
    let user = auth.login(&body.username, &body.password).await?;

    start_session(&session, &user).await?;

    Ok(Json(user))
}

/// Logout the current session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    Ok(StatusCode::OK)
}

/// The currently logged-in account.
#[instrument(skip(state))]
pub async fn me(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let auth = AuthService::new(state.store());
    let user = auth.get_user(current.id).await?;

    Ok(Json(user))
}

/// Rotate the session ID and store the identity.
async fn start_session(session: &Session, user: &User) -> Result<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("failed to cycle session: {e}")))?;
    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;

    Ok(())
}
