//! Administration.
//!
//! - GET `/metrics` - File server hit count as an HTML page
//! - POST `/reset` - Zero the hit count and delete every user (dev only)

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use super::error::{ApiError, ResultExt};
use crate::db::Database;

/// Platform name under which destructive admin endpoints are enabled.
pub const DEV_PLATFORM: &str = "dev";

/// Requests served under `/app`, shared by the file server and the admin routes.
pub type HitCounter = Arc<AtomicU64>;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub platform: String,
    pub hits: HitCounter,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

async fn metrics(State(state): State<AdminState>) -> impl IntoResponse {
    let hits = state.hits.load(Ordering::Relaxed);
    Html(format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
        hits
    ))
}

async fn reset(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    if state.platform != DEV_PLATFORM {
        warn!(platform = %state.platform, "Rejected reset outside dev platform");
        return Err(ApiError::forbidden("Reset is only allowed in dev"));
    }

    state.hits.store(0, Ordering::Relaxed);

    let count = state
        .db
        .users()
        .delete_all()
        .await
        .db_err("Failed to reset users")?;

    info!(count, "Reset: deleted all users");
    Ok(StatusCode::OK)
}
