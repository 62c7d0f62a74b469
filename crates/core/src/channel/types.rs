//! Types for content channel operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body returned by the add-torrent endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTorrentResponse {
    /// Number of torrents the channel accepted, when reported.
    #[serde(default)]
    pub added: Option<u64>,
}

/// Body returned by the commit endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    #[serde(default)]
    pub success: Option<bool>,
}

/// Trait for content channel backends.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Add a torrent (magnet URI or .torrent URL) to the channel.
    async fn add_torrent(&self, uri: &str) -> Result<AddTorrentResponse, ChannelError>;

    /// Commit pending channel changes.
    async fn commit(&self) -> Result<CommitResponse, ChannelError>;
}
