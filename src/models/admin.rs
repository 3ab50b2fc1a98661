use crate::stores::session_registry::FileInfo;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ApiKeyQuery {
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct TorrentAddQuery {
    pub api_key: String,
    pub info_hash: String,
}

#[derive(Deserialize)]
pub struct TorrentRemoveQuery {
    pub api_key: String,
    pub info_hash: String,
}

/// Body of `POST /torrent/metadata`
#[derive(Deserialize)]
pub struct MetadataRequest {
    pub info_hash: String,
    pub name: String,
    pub files: Vec<FileInfo>,
}

/// Body of `POST /torrent/progress`
#[derive(Deserialize)]
pub struct ProgressRequest {
    pub info_hash: String,
    pub file_index: usize,
    pub bytes_completed: u64,
}

#[derive(Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
