mod admin;
mod chirps;
mod error;
mod files;
mod sessions;
mod users;
mod webhooks;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use crate::db::Database;
use crate::session::Sessions;

pub use admin::{DEV_PLATFORM, HitCounter};
pub use chirps::MAX_CHIRP_LENGTH;
pub use error::ApiError;

/// Create the `/api` router.
pub fn create_api_router(db: Database, sessions: Arc<Sessions>, polka_key: &str) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        sessions: sessions.clone(),
    };

    let sessions_state = sessions::SessionsState {
        db: db.clone(),
        sessions: sessions.clone(),
    };

    let chirps_state = chirps::ChirpsState {
        db: db.clone(),
        sessions,
    };

    let webhooks_state = webhooks::WebhooksState {
        db,
        polka_key: Arc::from(polka_key),
    };

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/users", users::router(users_state))
        .nest("/chirps", chirps::router(chirps_state))
        .nest("/polka", webhooks::router(webhooks_state))
        .merge(sessions::router(sessions_state))
}

/// Create the `/admin` router.
pub fn create_admin_router(db: Database, platform: &str, hits: HitCounter) -> Router {
    admin::router(admin::AdminState {
        db,
        platform: platform.to_string(),
        hits,
    })
}

/// Create the counted `/app` file server.
pub fn create_file_router(static_dir: &str, hits: HitCounter) -> Router {
    files::router(static_dir, hits)
}

/// A fresh hit counter starting at zero.
pub fn new_hit_counter() -> HitCounter {
    Arc::new(AtomicU64::new(0))
}

async fn healthz() -> &'static str {
    "OK"
}
