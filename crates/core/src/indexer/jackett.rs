//! Jackett feed backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::JackettConfig;

use super::feed_parser::parse_feed;
use super::torznab::TorznabUrlBuilder;
use super::{FeedItem, Indexer, IndexerError, TorznabQuery};

/// Jackett feed backend implementation.
pub struct JackettIndexer {
    client: Client,
    urls: TorznabUrlBuilder,
    query: TorznabQuery,
}

impl JackettIndexer {
    /// Create a new JackettIndexer. `query` is applied to every tracker feed request.
    pub fn new(config: &JackettConfig, query: TorznabQuery) -> Result<Self, IndexerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| IndexerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config, query))
    }

    /// Create a JackettIndexer around an existing HTTP client.
    pub fn with_client(client: Client, config: &JackettConfig, query: TorznabQuery) -> Self {
        Self {
            client,
            urls: TorznabUrlBuilder::new(config.base_url(), config.api_key.clone()),
            query,
        }
    }

    /// Check that Jackett answers a capabilities request for `tracker`.
    ///
    /// Catches a wrong address or API key before the first fetch tick. Jackett
    /// answers a bad key with a Torznab `<error>` document, which fails here.
    pub async fn probe(&self, tracker: &str) -> Result<(), IndexerError> {
        let body = self.get(&self.urls.caps_url(tracker)).await?;
        parse_feed(&body)?;
        debug!(tracker = tracker, "Jackett capabilities request succeeded");
        Ok(())
    }

    /// GET a Torznab URL and return the raw body of a successful response.
    async fn get(&self, url: &str) -> Result<Vec<u8>, IndexerError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                IndexerError::Timeout
            } else if e.is_connect() {
                IndexerError::ConnectionFailed(e.to_string())
            } else {
                IndexerError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IndexerError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IndexerError::ApiError(format!("Failed to read response: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Indexer for JackettIndexer {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn fetch_feed(&self, tracker: &str) -> Result<Vec<FeedItem>, IndexerError> {
        let url = self.urls.search_url(tracker, &self.query)?;
        debug!(tracker = tracker, "Requesting Jackett feed");

        let body = self.get(&url).await?;
        let items = parse_feed(&body)?;

        debug!(tracker = tracker, items = items.len(), "Jackett feed parsed");

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use httpmock::prelude::*;

    fn config_for(server: &MockServer) -> JackettConfig {
        JackettConfig {
            host: server.host(),
            port: server.port(),
            ..JackettConfig::new("test-key")
        }
    }

    #[tokio::test]
    async fn test_fetch_feed_parses_items() {
        let server = MockServer::start_async().await;
        let xml = fixtures::torznab_feed(&[
            fixtures::torznab_item("One", "1111", "magnet:?xt=urn:btih:1111"),
            fixtures::torznab_item("Two", "2222", "magnet:?xt=urn:btih:2222"),
        ]);
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2.0/indexers/rarbg/results/torznab/api")
                .query_param("t", "search")
                .query_param("apikey", "test-key");
            then.status(200)
                .header("content-type", "application/rss+xml")
                .body(xml.clone());
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        let items = indexer.fetch_feed("rarbg").await.unwrap();

        mock.assert();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, "1111");
        assert_eq!(items[1].link, "magnet:?xt=urn:btih:2222");
    }

    #[tokio::test]
    async fn test_fetch_feed_sends_search_params() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2.0/indexers/1337x/results/torznab/api")
                .query_param("q", "linux iso")
                .query_param("cat", "4000");
            then.status(200).body(fixtures::torznab_feed(&[]));
        });

        let query = TorznabQuery {
            q: Some("linux iso".to_string()),
            categories: Some("4000".to_string()),
            ..Default::default()
        };
        let indexer = JackettIndexer::new(&config_for(&server), query).unwrap();
        let items = indexer.fetch_feed("1337x").await.unwrap();

        mock.assert();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_feed_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET);
            then.status(401).body("Invalid API Key");
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        let err = indexer.fetch_feed("rarbg").await.unwrap_err();

        match err {
            IndexerError::ApiError(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Invalid API Key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_feed_malformed_xml() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("<rss><channel><item></channel></rss>");
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        let err = indexer.fetch_feed("rarbg").await.unwrap_err();
        assert!(matches!(err, IndexerError::Feed(_)));
    }

    #[tokio::test]
    async fn test_probe_requests_caps() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2.0/indexers/all/results/torznab/api")
                .query_param("t", "caps");
            then.status(200)
                .body(r#"<?xml version="1.0"?><caps><searching><search available="yes"/></searching></caps>"#);
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        indexer.probe(crate::indexer::ALL_TRACKERS).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_probe_rejects_bad_key() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).query_param("t", "caps");
            then.status(401);
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        assert!(indexer.probe("all").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_feed_torznab_error_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).query_param("t", "search");
            then.status(200)
                .body(r#"<?xml version="1.0" encoding="UTF-8"?><error code="100" description="Invalid API Key" />"#);
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        let err = indexer.fetch_feed("rarbg").await.unwrap_err();

        assert!(matches!(
            &err,
            IndexerError::Feed(crate::indexer::FeedError::Torznab { code, .. }) if code == "100"
        ));
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn test_probe_rejects_torznab_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).query_param("t", "caps");
            then.status(200)
                .body(r#"<error code="100" description="Invalid API Key"/>"#);
        });

        let indexer = JackettIndexer::new(&config_for(&server), TorznabQuery::default()).unwrap();
        assert!(matches!(
            indexer.probe("all").await,
            Err(IndexerError::Feed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_feed_connection_refused() {
        let config = JackettConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..JackettConfig::new("key")
        };
        let indexer = JackettIndexer::new(&config, TorznabQuery::default()).unwrap();
        let err = indexer.fetch_feed("rarbg").await.unwrap_err();
        assert!(matches!(
            err,
            IndexerError::ConnectionFailed(_) | IndexerError::ApiError(_)
        ));
    }
}
