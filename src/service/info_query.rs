use crate::client::{TorrentClient, TorrentFile, TorrentSession};
use crate::core::error::InfoError;
use crate::models::info_hash::InfoHash;
use crate::models::snapshot::{FileSnapshot, TorrentSnapshot};
use crate::service::context::{Interrupted, QueryContext};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Answers "what is in this torrent and how far along is it"
///
/// Read-only: the service looks sessions up, waits for their metadata and
/// copies what it sees. It never mutates the engine and keeps no state of
/// its own, so one instance can serve any number of concurrent queries.
pub struct InfoQueryService<C> {
    client: Arc<C>,
}

impl<C> Clone for InfoQueryService<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: TorrentClient> InfoQueryService<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Snapshot the torrent identified by `info_hash_hex`.
    ///
    /// Blocks until the session has metadata, or until `ctx` is cancelled or
    /// its deadline passes. A malformed hash is rejected before the engine is
    /// consulted.
    pub async fn get_info(
        &self,
        ctx: &QueryContext,
        info_hash_hex: &str,
    ) -> Result<TorrentSnapshot, InfoError> {
        let info_hash =
            InfoHash::from_hex(info_hash_hex).map_err(|source| InfoError::InvalidInfoHash {
                input: info_hash_hex.to_string(),
                source,
            })?;

        let session = self
            .client
            .lookup_session(&info_hash)
            .ok_or(InfoError::TorrentNotFound { info_hash })?;

        let started = Instant::now();
        ctx.run(session.wait_for_metadata())
            .await
            .map_err(|interrupted| match interrupted {
                Interrupted::Cancelled => InfoError::Cancelled { info_hash },
                Interrupted::DeadlineExceeded => InfoError::DeadlineExceeded {
                    info_hash,
                    waited: started.elapsed(),
                },
            })?;

        let snapshot = snapshot_session(session.as_ref());

        debug!(
            info_hash = %info_hash,
            files = snapshot.files.len(),
            waited = ?started.elapsed(),
            "Torrent info snapshot taken"
        );

        Ok(snapshot)
    }
}

fn snapshot_session<S: TorrentSession>(session: &S) -> TorrentSnapshot {
    // The file list is fetched once so the result matches a single ordering;
    // completion counters are read per file and may drift between entries.
    let files = session
        .files()
        .iter()
        .map(|file| FileSnapshot {
            display_path: file.display_path(),
            length: file.length(),
            bytes_completed: file.bytes_completed(),
        })
        .collect();

    TorrentSnapshot {
        name: session.name(),
        total_length: session.total_length(),
        files,
    }
}
