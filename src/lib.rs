pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod db;
pub mod filter;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod session;

use api::{create_admin_router, create_api_router, create_file_router, new_hit_counter};
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use session::Sessions;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// API key the payment provider presents on webhook calls
    pub polka_key: String,
    /// Deployment platform; "dev" enables admin reset
    pub platform: String,
    /// Directory served under `/app`
    pub static_dir: String,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));
    let sessions = Arc::new(Sessions::new(jwt, config.db.refresh_tokens()));
    let hits = new_hit_counter();

    Router::new()
        .nest(
            "/api",
            create_api_router(config.db.clone(), sessions, &config.polka_key),
        )
        .nest(
            "/admin",
            create_admin_router(config.db.clone(), &config.platform, hits.clone()),
        )
        .merge(create_file_router(&config.static_dir, hits))
}

/// Run cleanup tasks and spawn background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(db: &Database) {
    cleanup::run_cleanup(db).await;
    cleanup::spawn_cleanup_scheduler(db.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Call `init_cleanup` before this to run cleanup on startup.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app.into_make_service()).await
}
