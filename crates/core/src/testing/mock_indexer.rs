//! Mock indexer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::indexer::{FeedError, FeedItem, Indexer, IndexerError};

/// Mock implementation of the Indexer trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable feeds per tracker
/// - Track requested trackers for assertions
/// - Simulate per-tracker or blanket failures
///
/// Trackers with neither a feed nor an error configured return an empty feed.
///
/// # Example
///
/// ```rust,ignore
/// let indexer = MockIndexer::new();
/// indexer.set_feed("rarbg", fixtures::feed_items(3)).await;
///
/// let items = indexer.fetch_feed("rarbg").await?;
/// assert_eq!(items.len(), 3);
/// assert_eq!(indexer.requested_trackers().await, vec!["rarbg"]);
/// ```
#[derive(Debug, Default)]
pub struct MockIndexer {
    feeds: Arc<RwLock<HashMap<String, Vec<FeedItem>>>>,
    errors: Arc<RwLock<HashMap<String, IndexerError>>>,
    default_error: Arc<RwLock<Option<IndexerError>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockIndexer {
    /// Create a new mock indexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feed returned for a tracker.
    pub async fn set_feed(&self, tracker: &str, items: Vec<FeedItem>) {
        self.feeds.write().await.insert(tracker.to_string(), items);
    }

    /// Make every fetch of `tracker` fail with `error`.
    pub async fn set_error(&self, tracker: &str, error: IndexerError) {
        self.errors.write().await.insert(tracker.to_string(), error);
    }

    /// Make every tracker without a configured feed fail with `error`.
    pub async fn set_default_error(&self, error: IndexerError) {
        *self.default_error.write().await = Some(error);
    }

    /// Trackers requested so far, in call order.
    pub async fn requested_trackers(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

/// IndexerError is not Clone; rebuild an equivalent error for repeated calls.
fn replay(error: &IndexerError) -> IndexerError {
    match error {
        IndexerError::ConnectionFailed(msg) => IndexerError::ConnectionFailed(msg.clone()),
        IndexerError::ApiError(msg) => IndexerError::ApiError(msg.clone()),
        IndexerError::InvalidQuery(msg) => IndexerError::InvalidQuery(msg.clone()),
        IndexerError::Feed(e) => IndexerError::Feed(FeedError::Parse(e.to_string())),
        IndexerError::Timeout => IndexerError::Timeout,
        IndexerError::Internal(msg) => IndexerError::Internal(msg.clone()),
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_feed(&self, tracker: &str) -> Result<Vec<FeedItem>, IndexerError> {
        self.requests.write().await.push(tracker.to_string());

        if let Some(error) = self.errors.read().await.get(tracker) {
            return Err(replay(error));
        }
        if let Some(items) = self.feeds.read().await.get(tracker) {
            return Ok(items.clone());
        }
        match self.default_error.read().await.as_ref() {
            Some(error) => Err(replay(error)),
            None => Ok(Vec::new()),
        }
    }
}
