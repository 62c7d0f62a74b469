//! Tribler channel client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::TriblerConfig;

use super::{AddTorrentResponse, ChannelClient, ChannelError, CommitResponse};

const HEADER_API_KEY: &str = "X-Api-Key";
const ADD_TORRENT_ENDPOINT: &str = "/mychannel/torrents";
const COMMIT_ENDPOINT: &str = "/mychannel/commit";

/// Tribler REST client for the local user's channel.
pub struct TriblerClient {
    client: Client,
    base_url: String,
}

impl TriblerClient {
    /// Create a new Tribler client.
    pub fn new(config: &TriblerConfig) -> Result<Self, ChannelError> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key).map_err(|_| {
                ChannelError::Internal("API key contains invalid characters".to_string())
            })?;
            default_headers.insert(HEADER_API_KEY, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ChannelError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    /// Send a request and decode the JSON body, tolerating non-JSON replies.
    async fn send<T>(&self, request: RequestBuilder) -> Result<T, ChannelError>
    where
        T: DeserializeOwned + Default,
    {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ChannelError::Timeout
            } else if e.is_connect() {
                ChannelError::ConnectionFailed(e.to_string())
            } else {
                ChannelError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ChannelError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}

#[async_trait]
impl ChannelClient for TriblerClient {
    fn name(&self) -> &str {
        "tribler"
    }

    async fn add_torrent(&self, uri: &str) -> Result<AddTorrentResponse, ChannelError> {
        let request = self
            .client
            .put(self.url(ADD_TORRENT_ENDPOINT))
            .form(&[("uri", uri)]);

        let response: AddTorrentResponse = self.send(request).await?;
        debug!(uri = uri, added = ?response.added, "Torrent submitted to channel");
        Ok(response)
    }

    async fn commit(&self) -> Result<CommitResponse, ChannelError> {
        let request = self.client.post(self.url(COMMIT_ENDPOINT));

        let response: CommitResponse = self.send(request).await?;
        debug!(success = ?response.success, "Channel commit requested");
        Ok(response)
    }
}
