//! Types for the sync loops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{SyncConfig, DEFAULT_ADD_CHUNK_SIZE};

/// Loop settings for the syncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Trackers polled on every fetch tick, in order.
    pub trackers: Vec<String>,
    pub query_interval: Duration,
    pub commit_interval: Duration,
    /// Maximum concurrent add-torrent requests per tracker feed.
    pub add_chunk_size: usize,
}

impl SyncSettings {
    pub fn new(trackers: Vec<String>, query_interval: Duration, commit_interval: Duration) -> Self {
        Self {
            trackers,
            query_interval,
            commit_interval,
            add_chunk_size: DEFAULT_ADD_CHUNK_SIZE,
        }
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            trackers: config.trackers.clone(),
            query_interval: config.intervals.query_interval(),
            commit_interval: config.intervals.commit_interval(),
            add_chunk_size: config.tribler.add_chunk_size,
        }
    }
}

/// Outcome of syncing one tracker's feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerReport {
    pub tracker: String,
    /// Items parsed from the feed.
    pub items: usize,
    /// Items the channel accepted.
    pub added: usize,
    /// Items whose add request failed.
    pub failed: usize,
    /// Set when the feed itself could not be fetched or parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one fetch tick across all trackers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub trackers: Vec<TrackerReport>,
}

impl FetchReport {
    pub fn items(&self) -> usize {
        self.trackers.iter().map(|t| t.items).sum()
    }

    pub fn added(&self) -> usize {
        self.trackers.iter().map(|t| t.added).sum()
    }

    pub fn failed(&self) -> usize {
        self.trackers.iter().map(|t| t.failed).sum()
    }

    pub fn feed_errors(&self) -> usize {
        self.trackers.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Running totals since the syncer started.
#[derive(Debug, Default)]
pub(crate) struct SyncCounters {
    pub fetch_cycles: AtomicU64,
    pub feed_errors: AtomicU64,
    pub torrents_added: AtomicU64,
    pub add_failures: AtomicU64,
    pub commits: AtomicU64,
    pub commit_failures: AtomicU64,
}

impl SyncCounters {
    pub fn record_fetch(&self, report: &FetchReport) {
        self.fetch_cycles.fetch_add(1, Ordering::Relaxed);
        self.feed_errors
            .fetch_add(report.feed_errors() as u64, Ordering::Relaxed);
        self.torrents_added
            .fetch_add(report.added() as u64, Ordering::Relaxed);
        self.add_failures
            .fetch_add(report.failed() as u64, Ordering::Relaxed);
    }

    pub fn record_commit(&self, ok: bool) {
        if ok {
            self.commits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.commit_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Current status of the syncer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub running: bool,
    pub fetch_cycles: u64,
    pub feed_errors: u64,
    pub torrents_added: u64,
    pub add_failures: u64,
    pub commits: u64,
    pub commit_failures: u64,
}

impl SyncStatus {
    pub(crate) fn snapshot(running: bool, counters: &SyncCounters) -> Self {
        Self {
            running,
            fetch_cycles: counters.fetch_cycles.load(Ordering::Relaxed),
            feed_errors: counters.feed_errors.load(Ordering::Relaxed),
            torrents_added: counters.torrents_added.load(Ordering::Relaxed),
            add_failures: counters.add_failures.load(Ordering::Relaxed),
            commits: counters.commits.load(Ordering::Relaxed),
            commit_failures: counters.commit_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JackettConfig, SyncIntervals, TriblerConfig};
    use crate::indexer::TorznabQuery;

    #[test]
    fn test_settings_from_config() {
        let config = SyncConfig {
            jackett: JackettConfig::new("key"),
            tribler: TriblerConfig {
                add_chunk_size: 7,
                ..TriblerConfig::default()
            },
            trackers: vec!["a".to_string(), "b".to_string()],
            intervals: SyncIntervals {
                query_interval_secs: 5,
                commit_interval_secs: 10,
            },
            search: TorznabQuery::default(),
        };

        let settings = SyncSettings::from(&config);
        assert_eq!(settings.trackers, vec!["a", "b"]);
        assert_eq!(settings.query_interval, Duration::from_secs(5));
        assert_eq!(settings.commit_interval, Duration::from_secs(10));
        assert_eq!(settings.add_chunk_size, 7);
    }

    #[test]
    fn test_report_totals() {
        let report = FetchReport {
            trackers: vec![
                TrackerReport {
                    tracker: "a".to_string(),
                    items: 3,
                    added: 2,
                    failed: 1,
                    error: None,
                },
                TrackerReport {
                    tracker: "b".to_string(),
                    error: Some("HTTP 500".to_string()),
                    ..Default::default()
                },
            ],
        };

        assert_eq!(report.items(), 3);
        assert_eq!(report.added(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.feed_errors(), 1);
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = SyncCounters::default();
        counters.record_fetch(&FetchReport {
            trackers: vec![TrackerReport {
                tracker: "a".to_string(),
                items: 2,
                added: 2,
                ..Default::default()
            }],
        });
        counters.record_commit(true);
        counters.record_commit(false);

        let status = SyncStatus::snapshot(true, &counters);
        assert!(status.running);
        assert_eq!(status.fetch_cycles, 1);
        assert_eq!(status.torrents_added, 2);
        assert_eq!(status.commits, 1);
        assert_eq!(status.commit_failures, 1);
    }
}
