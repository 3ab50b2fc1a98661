pub mod client;
pub mod core;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod service;
pub mod stores;
pub mod utils;

pub use client::{TorrentClient, TorrentFile, TorrentSession};
pub use crate::core::error::InfoError;
pub use models::info_hash::InfoHash;
pub use models::snapshot::{FileSnapshot, TorrentSnapshot};
pub use service::context::QueryContext;
pub use service::info_query::InfoQueryService;
