//! Mock channel client for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::channel::{AddTorrentResponse, ChannelClient, ChannelError, CommitResponse};

/// Mock implementation of the ChannelClient trait.
///
/// Records accepted torrents and successful commits. Specific URIs can be
/// rejected, and the next commit can be made to fail.
///
/// # Example
///
/// ```rust,ignore
/// let channel = MockChannelClient::new();
/// channel.add_torrent("magnet:?xt=urn:btih:abc").await?;
/// channel.commit().await?;
///
/// assert_eq!(channel.added_uris().await.len(), 1);
/// assert_eq!(channel.commit_count().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockChannelClient {
    added: Arc<RwLock<Vec<String>>>,
    rejected: Arc<RwLock<HashSet<String>>>,
    commits: Arc<RwLock<usize>>,
    next_commit_error: Arc<RwLock<Option<ChannelError>>>,
}

impl MockChannelClient {
    /// Create a new mock channel client.
    pub fn new() -> Self {
        Self::default()
    }

    /// URIs accepted so far, in completion order.
    pub async fn added_uris(&self) -> Vec<String> {
        self.added.read().await.clone()
    }

    /// Number of successful commits.
    pub async fn commit_count(&self) -> usize {
        *self.commits.read().await
    }

    /// Fail every add request for `uri`.
    pub async fn reject_uri(&self, uri: &str) {
        self.rejected.write().await.insert(uri.to_string());
    }

    /// Configure the next commit to fail with the given error.
    pub async fn set_next_commit_error(&self, error: ChannelError) {
        *self.next_commit_error.write().await = Some(error);
    }
}

#[async_trait]
impl ChannelClient for MockChannelClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_torrent(&self, uri: &str) -> Result<AddTorrentResponse, ChannelError> {
        if self.rejected.read().await.contains(uri) {
            return Err(ChannelError::ApiError(format!("HTTP 500: rejected {}", uri)));
        }
        self.added.write().await.push(uri.to_string());
        Ok(AddTorrentResponse { added: Some(1) })
    }

    async fn commit(&self) -> Result<CommitResponse, ChannelError> {
        if let Some(error) = self.next_commit_error.write().await.take() {
            return Err(error);
        }
        *self.commits.write().await += 1;
        Ok(CommitResponse {
            success: Some(true),
        })
    }
}
