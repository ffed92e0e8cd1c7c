//! Chirp endpoints.
//!
//! - POST `/` - Post a chirp (auth required)
//! - GET `/` - List chirps, optionally by author and in either order
//! - GET `/{id}` - Get one chirp
//! - DELETE `/{id}` - Delete own chirp (auth required)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, parse_uuid};
use crate::auth::Auth;
use crate::db::{Chirp, ChirpOrder, Database};
use crate::filter::filter_profanity;
use crate::impl_has_sessions;
use crate::session::Sessions;

/// Longest accepted chirp, in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

#[derive(Clone)]
pub struct ChirpsState {
    pub db: Database,
    pub sessions: Arc<Sessions>,
}

impl_has_sessions!(ChirpsState);

pub fn router(state: ChirpsState) -> Router {
    Router::new()
        .route("/", get(list_chirps).post(create_chirp))
        .route("/{id}", get(get_chirp).delete(delete_chirp))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    body: String,
}

#[derive(Deserialize)]
struct ListQuery {
    author_id: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
struct ChirpResponse {
    id: String,
    body: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id.to_string(),
            body: chirp.body,
            user_id: chirp.user_id.to_string(),
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
        }
    }
}

fn parse_order(sort: Option<&str>) -> Result<ChirpOrder, ApiError> {
    match sort {
        None | Some("") | Some("asc") => Ok(ChirpOrder::Asc),
        Some("desc") => Ok(ChirpOrder::Desc),
        Some(_) => Err(ApiError::bad_request("sort must be asc or desc")),
    }
}

async fn create_chirp(
    State(state): State<ChirpsState>,
    Auth(user_id): Auth,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }

    let body = filter_profanity(&payload.body);
    let chirp = state
        .db
        .chirps()
        .create(user_id, &body)
        .await
        .db_err("Failed to create chirp")?;

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

async fn list_chirps(
    State(state): State<ChirpsState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(id) => Some(parse_uuid(id)?),
    };
    let order = parse_order(query.sort.as_deref())?;

    let chirps = state
        .db
        .chirps()
        .list(author, order)
        .await
        .db_err("Failed to list chirps")?;

    Ok(Json(
        chirps
            .into_iter()
            .map(ChirpResponse::from)
            .collect::<Vec<_>>(),
    ))
}

async fn get_chirp(
    State(state): State<ChirpsState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_uuid(&id)?;

    let chirp = state
        .db
        .chirps()
        .get(id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

async fn delete_chirp(
    State(state): State<ChirpsState>,
    Auth(user_id): Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_uuid(&id)?;

    let chirp = state
        .db
        .chirps()
        .get(id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    if chirp.user_id != user_id {
        return Err(ApiError::forbidden("Cannot delete another user's chirp"));
    }

    state
        .db
        .chirps()
        .delete(id)
        .await
        .db_err("Failed to delete chirp")?;

    Ok(StatusCode::NO_CONTENT)
}
