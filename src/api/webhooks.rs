//! Payment provider webhooks.
//!
//! - POST `/webhooks` - Event notification, authenticated with `ApiKey`

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ApiError, ResultExt, parse_uuid};
use crate::auth::{HasWebhookKey, WebhookAuth};
use crate::db::Database;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Clone)]
pub struct WebhooksState {
    pub db: Database,
    pub polka_key: Arc<str>,
}

impl HasWebhookKey for WebhooksState {
    fn webhook_key(&self) -> &str {
        &self.polka_key
    }
}

pub fn router(state: WebhooksState) -> Router {
    Router::new()
        .route("/webhooks", post(handle_event))
        .with_state(state)
}

#[derive(Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    data: EventData,
}

#[derive(Deserialize, Default)]
struct EventData {
    user_id: Option<String>,
}

async fn handle_event(
    State(state): State<WebhooksState>,
    _auth: WebhookAuth,
    Json(payload): Json<WebhookEvent>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.event != USER_UPGRADED {
        debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload
        .data
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Missing user_id"))
        .and_then(parse_uuid)?;

    let upgraded = state
        .db
        .users()
        .upgrade_to_red(user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("User not found"));
    }

    info!(%user_id, "Upgraded user to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
