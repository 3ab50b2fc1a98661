use crate::core::error::InfoError;
use crate::models::snapshot::TorrentSnapshot;
use crate::stores::session_registry::SessionRegistry;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Counters for info queries, split by outcome
pub struct QueryMetrics {
    pub total_queries: AtomicU64,
    pub successful: AtomicU64,
    pub invalid_info_hash: AtomicU64,
    pub not_found: AtomicU64,
    pub cancelled: AtomicU64,
    pub deadline_exceeded: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub successful: u64,
    pub invalid_info_hash: u64,
    pub not_found: u64,
    pub cancelled: u64,
    pub deadline_exceeded: u64,
    pub success_rate: f64,
    pub registered_torrents: usize,
    pub torrents_with_metadata: usize,
    pub uptime_seconds: i64,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            successful: AtomicU64::new(0),
            invalid_info_hash: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            deadline_exceeded: AtomicU64::new(0),
            start_time: unix_now(),
        }
    }

    /// Count one finished query
    pub fn record(&self, outcome: &Result<TorrentSnapshot, InfoError>) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);

        let counter = match outcome {
            Ok(_) => &self.successful,
            Err(InfoError::InvalidInfoHash { .. }) => &self.invalid_info_hash,
            Err(InfoError::TorrentNotFound { .. }) => &self.not_found,
            Err(InfoError::Cancelled { .. }) => &self.cancelled,
            Err(InfoError::DeadlineExceeded { .. }) => &self.deadline_exceeded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self, registry: &SessionRegistry) -> MetricsSnapshot {
        let total_queries = self.total_queries.load(Ordering::Relaxed);
        let successful = self.successful.load(Ordering::Relaxed);

        let success_rate = if total_queries > 0 {
            (successful as f64 / total_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            total_queries,
            successful,
            invalid_info_hash: self.invalid_info_hash.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            deadline_exceeded: self.deadline_exceeded.load(Ordering::Relaxed),
            success_rate,
            registered_torrents: registry.len(),
            torrents_with_metadata: registry.with_metadata_count(),
            uptime_seconds: unix_now() - self.start_time,
        }
    }
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::info_hash::InfoHash;
    use std::time::Duration;

    fn snapshot() -> TorrentSnapshot {
        TorrentSnapshot {
            name: "t".to_string(),
            total_length: 0,
            files: Vec::new(),
        }
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = QueryMetrics::new();
        let snapshot = metrics.get_snapshot(&SessionRegistry::new());

        assert_eq!(snapshot.total_queries, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.registered_torrents, 0);
        assert!(snapshot.uptime_seconds >= 0);
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = QueryMetrics::new();
        let info_hash = InfoHash::new([3; 20]);

        metrics.record(&Ok(snapshot()));
        metrics.record(&Ok(snapshot()));
        metrics.record(&Err(InfoError::TorrentNotFound { info_hash }));
        metrics.record(&Err(InfoError::DeadlineExceeded {
            info_hash,
            waited: Duration::from_secs(1),
        }));

        let registry = SessionRegistry::new();
        registry.register(info_hash).unwrap();
        let snapshot = metrics.get_snapshot(&registry);

        assert_eq!(snapshot.total_queries, 4);
        assert_eq!(snapshot.successful, 2);
        assert_eq!(snapshot.not_found, 1);
        assert_eq!(snapshot.deadline_exceeded, 1);
        assert_eq!(snapshot.cancelled, 0);
        assert_eq!(snapshot.success_rate, 50.0);
        assert_eq!(snapshot.registered_torrents, 1);
        assert_eq!(snapshot.torrents_with_metadata, 0);
    }
}
