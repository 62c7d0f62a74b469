//! Types for the feed indexing system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::feed_parser::FeedError;

/// Optional Torznab search parameters appended to a tracker request.
///
/// An empty query fetches the tracker's raw feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TorznabQuery {
    /// Free-text search phrase (`q`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Maximum number of results (`limit`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Comma separated category ids (`cat`), e.g. "2000,5000".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    /// Drop results older than this many days (`maxage`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<u32>,
    /// Skip this many results (`offset`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl TorznabQuery {
    /// Check if any parameter is set.
    pub fn is_empty(&self) -> bool {
        self.q.is_none()
            && self.limit.is_none()
            && self.categories.is_none()
            && self.max_age_days.is_none()
            && self.offset.is_none()
    }
}

/// One torrent entry pulled out of a Torznab feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Info hash when the indexer reports one, otherwise the item title.
    pub key: String,
    /// Magnet URI, or the item's plain link when no magnet is published.
    pub link: String,
}

impl FeedItem {
    pub fn new(key: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            link: link.into(),
        }
    }

    pub fn is_magnet(&self) -> bool {
        self.link.starts_with("magnet:")
    }
}

/// Errors that can occur while fetching a tracker feed.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Indexer connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Indexer API error: {0}")]
    ApiError(String),

    #[error("Invalid Torznab query: {0}")]
    InvalidQuery(String),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for tracker feed backends.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch and parse the feed of a single tracker.
    async fn fetch_feed(&self, tracker: &str) -> Result<Vec<FeedItem>, IndexerError>;
}
