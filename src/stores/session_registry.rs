use crate::client::{TorrentClient, TorrentFile, TorrentSession};
use crate::models::info_hash::InfoHash;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Torrent already registered: {0}")]
    AlreadyRegistered(InfoHash),

    #[error("Metadata already published for {0}")]
    MetadataAlreadyPublished(InfoHash),

    #[error("Metadata not yet available for {0}")]
    MetadataPending(InfoHash),

    #[error("Torrent name must not be empty")]
    EmptyName,

    #[error("Torrent must contain at least one file")]
    NoFiles,

    #[error("File index {index} out of range, torrent has {count} files")]
    FileIndexOutOfRange { index: usize, count: usize },

    #[error("bytes_completed {bytes_completed} exceeds length {length} of file {index}")]
    CompletedExceedsLength {
        index: usize,
        bytes_completed: u64,
        length: u64,
    },
}

/// A file as announced by the engine when metadata arrives
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub length: u64,
}

#[derive(Debug)]
pub struct FileEntry {
    path: String,
    length: u64,
    completed: AtomicU64,
}

impl TorrentFile for FileEntry {
    fn display_path(&self) -> String {
        self.path.clone()
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn bytes_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Metadata {
    name: String,
    total_length: u64,
    files: Vec<Arc<FileEntry>>,
}

/// One tracked torrent
///
/// Starts without metadata. Waiters park on a watch channel until
/// [`Session::publish_metadata`] fills it in; metadata is immutable afterwards,
/// only per-file completion keeps moving.
#[derive(Debug)]
pub struct Session {
    info_hash: InfoHash,
    metadata: watch::Sender<Option<Arc<Metadata>>>,
}

impl Session {
    fn new(info_hash: InfoHash) -> Self {
        Self {
            info_hash,
            metadata: watch::Sender::new(None),
        }
    }

    pub fn info_hash(&self) -> InfoHash {
        self.info_hash
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.borrow().is_some()
    }

    /// Publish name and file list, waking every pending waiter
    pub fn publish_metadata(&self, name: String, files: Vec<FileInfo>) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if files.is_empty() {
            return Err(RegistryError::NoFiles);
        }

        let total_length = files
            .iter()
            .fold(0u64, |acc, file| acc.saturating_add(file.length));

        let metadata = Arc::new(Metadata {
            name,
            total_length,
            files: files
                .into_iter()
                .map(|file| {
                    Arc::new(FileEntry {
                        path: file.path,
                        length: file.length,
                        completed: AtomicU64::new(0),
                    })
                })
                .collect(),
        });

        let published = self.metadata.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(metadata);
            true
        });

        if published {
            Ok(())
        } else {
            Err(RegistryError::MetadataAlreadyPublished(self.info_hash))
        }
    }

    /// Record verified progress for one file
    pub fn set_bytes_completed(&self, index: usize, bytes_completed: u64) -> Result<(), RegistryError> {
        let metadata = self
            .current_metadata()
            .ok_or(RegistryError::MetadataPending(self.info_hash))?;

        let file = metadata
            .files
            .get(index)
            .ok_or(RegistryError::FileIndexOutOfRange {
                index,
                count: metadata.files.len(),
            })?;

        if bytes_completed > file.length {
            return Err(RegistryError::CompletedExceedsLength {
                index,
                bytes_completed,
                length: file.length,
            });
        }

        file.completed.store(bytes_completed, Ordering::Relaxed);
        Ok(())
    }

    fn current_metadata(&self) -> Option<Arc<Metadata>> {
        self.metadata.borrow().as_ref().map(Arc::clone)
    }
}

impl TorrentSession for Session {
    type File = FileEntry;

    fn name(&self) -> String {
        self.current_metadata()
            .map(|metadata| metadata.name.clone())
            .unwrap_or_default()
    }

    fn total_length(&self) -> u64 {
        self.current_metadata()
            .map(|metadata| metadata.total_length)
            .unwrap_or(0)
    }

    fn wait_for_metadata(&self) -> impl Future<Output = ()> + Send + '_ {
        let mut rx = self.metadata.subscribe();
        async move {
            // The sender lives in `self`, so the channel outlives this borrow
            // and wait_for can only return once metadata is present.
            let _ = rx.wait_for(Option::is_some).await;
        }
    }

    fn files(&self) -> Vec<Arc<FileEntry>> {
        self.current_metadata()
            .map(|metadata| metadata.files.clone())
            .unwrap_or_default()
    }
}

/// In-memory registry of sessions fed by the engine
pub struct SessionRegistry {
    sessions: DashMap<InfoHash, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: DashMap::with_capacity(capacity),
        }
    }

    /// Register a session without metadata
    pub fn register(&self, info_hash: InfoHash) -> Result<Arc<Session>, RegistryError> {
        match self.sessions.entry(info_hash) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(info_hash)),
            Entry::Vacant(vacant) => {
                let session = Arc::new(Session::new(info_hash));
                vacant.insert(Arc::clone(&session));
                Ok(session)
            }
        }
    }

    /// Drop a session. Callers already waiting on it keep their handle.
    pub fn remove(&self, info_hash: &InfoHash) -> Option<Arc<Session>> {
        self.sessions.remove(info_hash).map(|(_, session)| session)
    }

    pub fn get(&self, info_hash: &InfoHash) -> Option<Arc<Session>> {
        self.sessions
            .get(info_hash)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn with_metadata_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().has_metadata())
            .count()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TorrentClient for SessionRegistry {
    type Session = Session;

    fn lookup_session(&self, info_hash: &InfoHash) -> Option<Arc<Session>> {
        self.get(info_hash)
    }
}
