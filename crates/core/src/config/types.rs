use serde::Serialize;
use std::time::Duration;

use crate::indexer::TorznabQuery;

pub const DEFAULT_JACKETT_HOST: &str = "localhost";
pub const DEFAULT_JACKETT_PORT: u16 = 9117;
pub const DEFAULT_TRIBLER_HOST: &str = "localhost";
pub const DEFAULT_TRIBLER_PORT: u16 = 8085;
pub const DEFAULT_QUERY_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_COMMIT_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;
pub const DEFAULT_ADD_CHUNK_SIZE: usize = 100;

/// Root configuration, built from the command line
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub jackett: JackettConfig,
    pub tribler: TriblerConfig,
    /// Jackett indexer identifiers whose feeds are mirrored.
    pub trackers: Vec<String>,
    pub intervals: SyncIntervals,
    /// Extra Torznab search parameters applied to every tracker request.
    pub search: TorznabQuery,
}

/// Jackett indexing service configuration
#[derive(Debug, Clone)]
pub struct JackettConfig {
    pub host: String,
    pub port: u16,
    /// Jackett API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u32,
}

impl JackettConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_JACKETT_HOST.to_string(),
            port: DEFAULT_JACKETT_PORT,
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Base URL without trailing slash (e.g. "http://localhost:9117").
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Tribler content service configuration
#[derive(Debug, Clone)]
pub struct TriblerConfig {
    pub host: String,
    pub port: u16,
    /// Sent as `X-Api-Key` when set.
    pub api_key: Option<String>,
    pub timeout_secs: u32,
    /// How many add-torrent requests are in flight at once.
    pub add_chunk_size: usize,
}

impl TriblerConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for TriblerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TRIBLER_HOST.to_string(),
            port: DEFAULT_TRIBLER_PORT,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            add_chunk_size: DEFAULT_ADD_CHUNK_SIZE,
        }
    }
}

/// Timer settings for the two sync loops, in seconds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SyncIntervals {
    pub query_interval_secs: u64,
    pub commit_interval_secs: u64,
}

impl SyncIntervals {
    pub fn query_interval(&self) -> Duration {
        Duration::from_secs(self.query_interval_secs)
    }

    pub fn commit_interval(&self) -> Duration {
        Duration::from_secs(self.commit_interval_secs)
    }
}

impl Default for SyncIntervals {
    fn default() -> Self {
        Self {
            query_interval_secs: DEFAULT_QUERY_INTERVAL_SECS,
            commit_interval_secs: DEFAULT_COMMIT_INTERVAL_SECS,
        }
    }
}

/// Sanitized config for the startup log line (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub jackett_url: String,
    pub api_key_configured: bool,
    pub tribler_url: String,
    pub tribler_api_key_configured: bool,
    pub trackers: Vec<String>,
    pub intervals: SyncIntervals,
    pub search: TorznabQuery,
}

impl From<&SyncConfig> for SanitizedConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            jackett_url: config.jackett.base_url(),
            api_key_configured: !config.jackett.api_key.is_empty(),
            tribler_url: config.tribler.base_url(),
            tribler_api_key_configured: config
                .tribler
                .api_key
                .as_deref()
                .is_some_and(|k| !k.is_empty()),
            trackers: config.trackers.clone(),
            intervals: config.intervals,
            search: config.search.clone(),
        }
    }
}
