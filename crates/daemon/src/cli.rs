//! Command-line arguments.

use clap::{Parser, ValueEnum};

use channelfeed_core::config::{
    DEFAULT_ADD_CHUNK_SIZE, DEFAULT_COMMIT_INTERVAL_SECS, DEFAULT_JACKETT_HOST,
    DEFAULT_JACKETT_PORT, DEFAULT_QUERY_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_TRIBLER_HOST,
    DEFAULT_TRIBLER_PORT,
};
use channelfeed_core::{JackettConfig, SyncConfig, SyncIntervals, TorznabQuery, TriblerConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "channelfeed",
    version,
    about = "Mirror Jackett tracker feeds into a Tribler channel"
)]
pub struct Cli {
    /// Jackett API key
    pub api_key: String,

    /// Jackett indexers whose feeds are mirrored
    #[arg(required = true, num_args = 1..)]
    pub trackers: Vec<String>,

    #[arg(long = "jackett_ip", default_value = DEFAULT_JACKETT_HOST)]
    pub jackett_ip: String,

    #[arg(long = "jackett_port", default_value_t = DEFAULT_JACKETT_PORT)]
    pub jackett_port: u16,

    #[arg(long = "tribler_ip", default_value = DEFAULT_TRIBLER_HOST)]
    pub tribler_ip: String,

    #[arg(long = "tribler_port", default_value_t = DEFAULT_TRIBLER_PORT)]
    pub tribler_port: u16,

    /// Seconds between feed requests
    #[arg(long = "query_interval", default_value_t = DEFAULT_QUERY_INTERVAL_SECS)]
    pub query_interval: u64,

    /// Seconds between channel commits
    #[arg(long = "commit_interval", default_value_t = DEFAULT_COMMIT_INTERVAL_SECS)]
    pub commit_interval: u64,

    /// Tribler REST API key, sent as X-Api-Key
    #[arg(long = "tribler_api_key", env = "TRIBLER_API_KEY", hide_env_values = true)]
    pub tribler_api_key: Option<String>,

    /// HTTP request timeout in seconds, for both services
    #[arg(long = "http_timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub http_timeout: u32,

    /// Concurrent add-torrent requests per feed
    #[arg(long = "add_chunk_size", default_value_t = DEFAULT_ADD_CHUNK_SIZE)]
    pub add_chunk_size: usize,

    /// Search phrase instead of the raw tracker feed
    #[arg(long = "query")]
    pub query: Option<String>,

    /// Maximum results per feed request
    #[arg(long = "limit")]
    pub limit: Option<u32>,

    /// Comma separated Torznab category ids, e.g. 2000,5000
    #[arg(long = "categories")]
    pub categories: Option<String>,

    /// Drop results older than this many days
    #[arg(long = "max_age")]
    pub max_age: Option<u32>,

    /// Skip this many results
    #[arg(long = "offset")]
    pub offset: Option<u32>,

    /// Log output format
    #[arg(long = "log_format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Build the sync configuration. Validation happens separately.
    pub fn into_config(self) -> SyncConfig {
        SyncConfig {
            jackett: JackettConfig {
                host: self.jackett_ip,
                port: self.jackett_port,
                api_key: self.api_key,
                timeout_secs: self.http_timeout,
            },
            tribler: TriblerConfig {
                host: self.tribler_ip,
                port: self.tribler_port,
                api_key: self.tribler_api_key,
                timeout_secs: self.http_timeout,
                add_chunk_size: self.add_chunk_size,
            },
            trackers: self.trackers,
            intervals: SyncIntervals {
                query_interval_secs: self.query_interval,
                commit_interval_secs: self.commit_interval,
            },
            search: TorznabQuery {
                q: self.query,
                limit: self.limit,
                categories: self.categories,
                max_age_days: self.max_age,
                offset: self.offset,
            },
        }
    }
}
