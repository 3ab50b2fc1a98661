// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/info/{info_hash}", get(crate::handlers::info::info_handler))
        .route("/health", get(crate::handlers::health::health_handler))

        // Admin endpoints (require API key)
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))
        .route("/torrent/add", get(crate::handlers::admin::torrent_add_handler))
        .route("/torrent/remove", get(crate::handlers::admin::torrent_remove_handler))
        .route("/torrent/metadata", post(crate::handlers::admin::torrent_metadata_handler))
        .route("/torrent/progress", post(crate::handlers::admin::torrent_progress_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}
