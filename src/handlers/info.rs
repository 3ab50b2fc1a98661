use crate::core::error::InfoError;
use crate::core::state::AppState;
use crate::service::context::QueryContext;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    /// How long to wait for metadata, clamped to the configured maximum
    pub timeout_ms: Option<u64>,
}

/// Torrent info snapshot
///
/// GET /info/{info_hash}?timeout_ms=<ms>
pub async fn info_handler(
    State(state): State<Arc<AppState>>,
    Path(info_hash): Path<String>,
    Query(params): Query<InfoQuery>,
) -> Result<Response, InfoError> {
    let timeout = state.config.query.effective_timeout(params.timeout_ms);
    let ctx = QueryContext::with_timeout(timeout).cancellation(state.shutdown.child_token());

    let result = state.info_service.get_info(&ctx, &info_hash).await;
    state.metrics.record(&result);

    match result {
        Ok(snapshot) => {
            debug!(
                info_hash = %info_hash,
                name = %snapshot.name,
                files = snapshot.files.len(),
                "Torrent info served"
            );
            Ok((StatusCode::OK, Json(snapshot)).into_response())
        }
        Err(e) => {
            warn!(
                info_hash = %info_hash,
                timeout = ?timeout,
                error = %e,
                "Torrent info query failed"
            );
            Err(e)
        }
    }
}
