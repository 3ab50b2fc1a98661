use serde::{Deserialize, Serialize};

/// Point-in-time copy of a torrent session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentSnapshot {
    pub name: String,
    #[serde(rename = "length")]
    pub total_length: u64,
    pub files: Vec<FileSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    pub display_path: String,
    pub length: u64,
    pub bytes_completed: u64,
}
