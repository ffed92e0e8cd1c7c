//! Static file server under `/app`, counting every request it sees.

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use std::sync::atomic::Ordering;
use tower_http::services::ServeDir;
use tracing::debug;

use super::admin::HitCounter;

pub fn router(static_dir: &str, hits: HitCounter) -> Router {
    Router::new()
        .nest_service("/app", ServeDir::new(static_dir))
        .route_layer(middleware::from_fn_with_state(hits, count_hit))
}

async fn count_hit(State(hits): State<HitCounter>, request: Request, next: Next) -> Response {
    let total = hits.fetch_add(1, Ordering::Relaxed) + 1;
    debug!(hits = total, "File server hit");
    next.run(request).await
}
