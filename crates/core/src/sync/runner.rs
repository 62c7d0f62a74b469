//! Feed syncer implementation.
//!
//! Runs two independent loops:
//! - Fetch: every query interval, pull each tracker's feed and add its torrents to the channel
//! - Commit: every commit interval, ask the channel to commit pending changes
//!
//! Both loops tick immediately on start. A failed unit of work (one tracker,
//! one torrent, one commit) is logged and left for the next tick. Shutdown
//! abandons a cycle that is still in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::channel::ChannelClient;
use crate::indexer::{FeedItem, Indexer};

use super::types::{FetchReport, SyncCounters, SyncSettings, SyncStatus, TrackerReport};

/// Mirrors tracker feeds into a content channel.
pub struct FeedSyncer {
    indexer: Arc<dyn Indexer>,
    channel: Arc<dyn ChannelClient>,
    settings: Arc<SyncSettings>,

    // Runtime state
    running: Arc<AtomicBool>,
    counters: Arc<SyncCounters>,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FeedSyncer {
    /// Create a new syncer.
    pub fn new(
        indexer: Arc<dyn Indexer>,
        channel: Arc<dyn ChannelClient>,
        settings: SyncSettings,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            indexer,
            channel,
            settings: Arc::new(settings),
            running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(SyncCounters::default()),
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start both loops (spawns background tasks).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Syncer already running");
            return;
        }

        info!(
            trackers = ?self.settings.trackers,
            query_interval_secs = self.settings.query_interval.as_secs(),
            commit_interval_secs = self.settings.commit_interval.as_secs(),
            indexer = self.indexer.name(),
            channel = self.channel.name(),
            "Starting feed syncer"
        );

        let fetch = self.spawn_fetch_loop();
        let commit = self.spawn_commit_loop();
        self.tasks.lock().await.extend([fetch, commit]);
    }

    /// Stop both loops and wait for them to exit.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Syncer not running");
            return;
        }

        info!("Stopping feed syncer");

        // Signal shutdown to all loops
        let _ = self.shutdown_tx.send(());

        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Sync loop ended abnormally");
            }
        }

        info!("Feed syncer stopped");
    }

    /// Get current syncer status.
    pub fn status(&self) -> SyncStatus {
        SyncStatus::snapshot(self.running.load(Ordering::Relaxed), &self.counters)
    }

    /// Run a single fetch tick across every tracker.
    pub async fn fetch_once(&self) -> FetchReport {
        let report = Self::fetch_cycle(&self.indexer, &self.channel, &self.settings).await;
        self.counters.record_fetch(&report);
        report
    }

    /// Run a single commit.
    pub async fn commit_once(&self) -> bool {
        let ok = Self::commit(&self.channel).await;
        self.counters.record_commit(ok);
        ok
    }

    /// Spawn the fetch loop task.
    fn spawn_fetch_loop(&self) -> JoinHandle<()> {
        let indexer = Arc::clone(&self.indexer);
        let channel = Arc::clone(&self.channel);
        let settings = Arc::clone(&self.settings);
        let counters = Arc::clone(&self.counters);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Fetch loop started");
            let mut ticker = ticker(settings.query_interval);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Fetch loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let report = tokio::select! {
                            report = Self::fetch_cycle(&indexer, &channel, &settings) => report,
                            _ = shutdown_rx.recv() => {
                                info!("Fetch loop received shutdown signal, abandoning cycle");
                                break;
                            }
                        };
                        counters.record_fetch(&report);
                        info!(
                            items = report.items(),
                            added = report.added(),
                            failed = report.failed(),
                            feed_errors = report.feed_errors(),
                            "Fetch cycle complete"
                        );
                    }
                }
            }
            info!("Fetch loop stopped");
        })
    }

    /// Spawn the commit loop task.
    fn spawn_commit_loop(&self) -> JoinHandle<()> {
        let channel = Arc::clone(&self.channel);
        let counters = Arc::clone(&self.counters);
        let running = Arc::clone(&self.running);
        let period = self.settings.commit_interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Commit loop started");
            let mut ticker = ticker(period);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Commit loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let ok = tokio::select! {
                            ok = Self::commit(&channel) => ok,
                            _ = shutdown_rx.recv() => {
                                info!("Commit loop received shutdown signal, abandoning commit");
                                break;
                            }
                        };
                        counters.record_commit(ok);
                    }
                }
            }
            info!("Commit loop stopped");
        })
    }

    async fn fetch_cycle(
        indexer: &Arc<dyn Indexer>,
        channel: &Arc<dyn ChannelClient>,
        settings: &SyncSettings,
    ) -> FetchReport {
        let mut trackers = Vec::with_capacity(settings.trackers.len());
        for tracker in &settings.trackers {
            trackers.push(Self::sync_tracker(indexer, channel, tracker, settings.add_chunk_size).await);
        }
        FetchReport { trackers }
    }

    /// Fetch one tracker's feed and push every item to the channel.
    async fn sync_tracker(
        indexer: &Arc<dyn Indexer>,
        channel: &Arc<dyn ChannelClient>,
        tracker: &str,
        chunk_size: usize,
    ) -> TrackerReport {
        let items = match indexer.fetch_feed(tracker).await {
            Ok(items) => items,
            Err(e) => {
                warn!(tracker = %tracker, error = %e, "Feed fetch failed, skipping tracker");
                return TrackerReport {
                    tracker: tracker.to_string(),
                    error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        };

        let (added, failed) = Self::add_items(channel, tracker, &items, chunk_size).await;

        info!(
            tracker = %tracker,
            items = items.len(),
            added = added,
            failed = failed,
            "Tracker feed synced"
        );

        TrackerReport {
            tracker: tracker.to_string(),
            items: items.len(),
            added,
            failed,
            error: None,
        }
    }

    /// Add items in concurrent chunks; each chunk completes before the next starts.
    async fn add_items(
        channel: &Arc<dyn ChannelClient>,
        tracker: &str,
        items: &[FeedItem],
        chunk_size: usize,
    ) -> (usize, usize) {
        let mut added = 0;
        let mut failed = 0;

        for chunk in items.chunks(chunk_size.max(1)) {
            let results = join_all(chunk.iter().map(|item| channel.add_torrent(&item.link))).await;

            for (item, result) in chunk.iter().zip(results) {
                match result {
                    Ok(_) => {
                        debug!(
                            tracker = %tracker,
                            key = %item.key,
                            magnet = item.is_magnet(),
                            "Torrent added"
                        );
                        added += 1;
                    }
                    Err(e) => {
                        warn!(tracker = %tracker, key = %item.key, error = %e, "Failed to add torrent");
                        failed += 1;
                    }
                }
            }
        }

        (added, failed)
    }

    async fn commit(channel: &Arc<dyn ChannelClient>) -> bool {
        match channel.commit().await {
            Ok(response) => {
                info!(success = ?response.success, "Channel commit sent");
                true
            }
            Err(e) => {
                warn!(error = %e, "Channel commit failed");
                false
            }
        }
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
