use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::{
    ApiKeyQuery, MetadataRequest, ProgressRequest, SuccessResponse, TorrentAddQuery,
    TorrentRemoveQuery,
};
use crate::models::info_hash::InfoHash;
use crate::utils::auth::verify_api_key;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn success(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn authorize(state: &AppState, api_key: &str, action: &str) -> Result<(), AdminError> {
    if verify_api_key(api_key, &state.config.admin.api_key) {
        Ok(())
    } else {
        warn!(action, "Unauthorized admin request");
        Err(AdminError::InvalidApiKey)
    }
}

/// Register a torrent whose metadata is still being fetched
///
/// GET /torrent/add?api_key=<key>&info_hash=<hash>
pub async fn torrent_add_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TorrentAddQuery>,
) -> Result<Response, AdminError> {
    authorize(&state, &params.api_key, "torrent_add")?;

    let info_hash = InfoHash::from_hex(&params.info_hash)?;
    state.registry.register(info_hash)?;

    info!(info_hash = %info_hash, "Torrent registered");

    Ok(success("Torrent registered"))
}

/// GET /torrent/remove?api_key=<key>&info_hash=<hash>
pub async fn torrent_remove_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TorrentRemoveQuery>,
) -> Result<Response, AdminError> {
    authorize(&state, &params.api_key, "torrent_remove")?;

    let info_hash = InfoHash::from_hex(&params.info_hash)?;

    if state.registry.remove(&info_hash).is_none() {
        warn!(info_hash = %info_hash, "Torrent not found");
        return Err(AdminError::NotFound("Torrent not found".to_string()));
    }

    info!(info_hash = %info_hash, "Torrent removed");

    Ok(success("Torrent removed"))
}

/// Publish name and file list, releasing every query waiting on them
///
/// POST /torrent/metadata?api_key=<key>
pub async fn torrent_metadata_handler(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<ApiKeyQuery>,
    Json(request): Json<MetadataRequest>,
) -> Result<Response, AdminError> {
    authorize(&state, &auth.api_key, "torrent_metadata")?;

    let info_hash = InfoHash::from_hex(&request.info_hash)?;
    let session = state
        .registry
        .get(&info_hash)
        .ok_or_else(|| AdminError::NotFound("Torrent not found".to_string()))?;

    let file_count = request.files.len();
    session.publish_metadata(request.name, request.files)?;

    info!(info_hash = %info_hash, files = file_count, "Torrent metadata published");

    Ok(success("Metadata published"))
}

/// POST /torrent/progress?api_key=<key>
pub async fn torrent_progress_handler(
    State(state): State<Arc<AppState>>,
    Query(auth): Query<ApiKeyQuery>,
    Json(request): Json<ProgressRequest>,
) -> Result<Response, AdminError> {
    authorize(&state, &auth.api_key, "torrent_progress")?;

    let info_hash = InfoHash::from_hex(&request.info_hash)?;
    let session = state
        .registry
        .get(&info_hash)
        .ok_or_else(|| AdminError::NotFound("Torrent not found".to_string()))?;

    session.set_bytes_completed(request.file_index, request.bytes_completed)?;

    debug!(
        info_hash = %info_hash,
        file_index = request.file_index,
        bytes_completed = request.bytes_completed,
        "File progress updated"
    );

    Ok(success("Progress updated"))
}

#[cfg(test)]
mod tests {
    use crate::core::routes::build_router;
    use crate::core::state::AppState;
    use crate::models::info_hash::InfoHash;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const HASH: &str = "aabbccddeeff00112233445566778899aabbccdd";
    const KEY: &str = "test-api-key";

    async fn send(state: &Arc<AppState>, method: Method, uri: &str, body: Option<Value>) -> Response {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        build_router(Arc::clone(state)).oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn hash() -> InfoHash {
        InfoHash::from_hex(HASH).unwrap()
    }

    #[tokio::test]
    async fn test_add_requires_api_key() {
        let state = Arc::new(AppState::for_tests());

        let response = send(
            &state,
            Method::GET,
            &format!("/torrent/add?api_key=wrong&info_hash={HASH}"),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn test_add_then_duplicate_conflicts() {
        let state = Arc::new(AppState::for_tests());
        let uri = format!("/torrent/add?api_key={KEY}&info_hash={HASH}");

        let response = send(&state, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], json!(true));
        assert!(state.registry.get(&hash()).is_some());

        let response = send(&state, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_hash() {
        let state = Arc::new(AppState::for_tests());

        let response = send(
            &state,
            Method::GET,
            &format!("/torrent/add?api_key={KEY}&info_hash=nothex"),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove() {
        let state = Arc::new(AppState::for_tests());
        state.registry.register(hash()).unwrap();
        let uri = format!("/torrent/remove?api_key={KEY}&info_hash={HASH}");

        let response = send(&state, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.registry.is_empty());

        let response = send(&state, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metadata_and_progress_feed_the_query() {
        let state = Arc::new(AppState::for_tests());
        state.registry.register(hash()).unwrap();

        let response = send(
            &state,
            Method::POST,
            &format!("/torrent/metadata?api_key={KEY}"),
            Some(json!({
                "info_hash": HASH,
                "name": "docs",
                "files": [
                    { "path": "docs/readme.txt", "length": 10 },
                    { "path": "docs/manual.pdf", "length": 90 }
                ]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &state,
            Method::POST,
            &format!("/torrent/progress?api_key={KEY}"),
            Some(json!({ "info_hash": HASH, "file_index": 1, "bytes_completed": 45 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, Method::GET, &format!("/info/{HASH}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "name": "docs",
                "length": 100,
                "files": [
                    { "displayPath": "docs/readme.txt", "length": 10, "bytesCompleted": 0 },
                    { "displayPath": "docs/manual.pdf", "length": 90, "bytesCompleted": 45 }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_metadata_for_unknown_torrent() {
        let state = Arc::new(AppState::for_tests());

        let response = send(
            &state,
            Method::POST,
            &format!("/torrent/metadata?api_key={KEY}"),
            Some(json!({ "info_hash": HASH, "name": "x", "files": [{ "path": "x", "length": 1 }] })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_progress_validation() {
        let state = Arc::new(AppState::for_tests());
        let session = state.registry.register(hash()).unwrap();
        let uri = format!("/torrent/progress?api_key={KEY}");

        let response = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "info_hash": HASH, "file_index": 0, "bytes_completed": 1 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        session
            .publish_metadata(
                "x".to_string(),
                vec![crate::stores::session_registry::FileInfo {
                    path: "x".to_string(),
                    length: 5,
                }],
            )
            .unwrap();

        let response = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "info_hash": HASH, "file_index": 0, "bytes_completed": 6 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
