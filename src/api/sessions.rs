//! Login, access token refresh and refresh token revocation.
//!
//! - POST `/login` - Exchange email and password for a token pair
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/revoke` - Revoke a refresh token

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use super::users::{CredentialsRequest, UserResponse};
use crate::auth::BearerToken;
use crate::db::Database;
use crate::jwt::unix_now;
use crate::session::Sessions;

#[derive(Clone)]
pub struct SessionsState {
    pub db: Database,
    pub sessions: Arc<Sessions>,
}

pub fn router(state: SessionsState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: UserResponse,
    token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

async fn login(
    State(state): State<SessionsState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .db
        .users()
        .get_by_email(payload.email.trim())
        .await
        .db_err("Failed to look up user")?;

    let issued = state
        .sessions
        .login(account.as_ref(), &payload.password, unix_now())
        .await?;

    // login never succeeds without an account
    let user = account.ok_or_else(|| ApiError::internal("Login without account"))?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        user: user.into(),
        token: issued.access_token,
        refresh_token: issued.refresh_token,
    }))
}

async fn refresh(
    State(state): State<SessionsState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.sessions.refresh(&token, unix_now()).await?;
    Ok(Json(RefreshResponse { token }))
}

async fn revoke(
    State(state): State<SessionsState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.revoke(&token, unix_now()).await?;
    Ok(StatusCode::NO_CONTENT)
}
