pub mod channel;
pub mod config;
pub mod indexer;
pub mod sync;
pub mod testing;

pub use channel::{
    AddTorrentResponse, ChannelClient, ChannelError, CommitResponse, TriblerClient,
};
pub use config::{
    validate_config, ConfigError, JackettConfig, SanitizedConfig, SyncConfig, SyncIntervals,
    TriblerConfig,
};
pub use indexer::{
    parse_feed, FeedError, FeedItem, Indexer, IndexerError, JackettIndexer, TorznabQuery,
    TorznabUrlBuilder,
};
pub use sync::{FeedSyncer, FetchReport, SyncSettings, SyncStatus, TrackerReport};
