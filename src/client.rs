//! Read-only view of the torrent engine.
//!
//! The query service never touches an engine directly. It only sees these
//! traits, so any engine (or a test double) can sit behind it. Implementors
//! own their own synchronization; every accessor may observe a slightly
//! different instant than the previous one.

use crate::models::info_hash::InfoHash;
use std::future::Future;
use std::sync::Arc;

/// Registry of running torrent sessions, keyed by info-hash.
pub trait TorrentClient: Send + Sync + 'static {
    type Session: TorrentSession;

    /// Returns the session for `info_hash`, if the engine currently tracks it.
    fn lookup_session(&self, info_hash: &InfoHash) -> Option<Arc<Self::Session>>;
}

/// Handle to one torrent session owned by the engine.
pub trait TorrentSession: Send + Sync {
    type File: TorrentFile;

    fn name(&self) -> String;

    /// Sum of all file lengths in bytes.
    fn total_length(&self) -> u64;

    /// Resolves once name, length and file list are known.
    ///
    /// Must suspend rather than poll. Dropping the future abandons the wait.
    fn wait_for_metadata(&self) -> impl Future<Output = ()> + Send + '_;

    /// Files in the torrent's canonical order.
    fn files(&self) -> Vec<Arc<Self::File>>;
}

pub trait TorrentFile: Send + Sync {
    /// Path of the file inside the torrent.
    fn display_path(&self) -> String;

    fn length(&self) -> u64;

    /// Verified bytes at the time of the call. Best-effort progress only.
    fn bytes_completed(&self) -> u64;
}
