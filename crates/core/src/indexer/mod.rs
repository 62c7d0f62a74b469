//! Tracker feed abstraction.
//!
//! This module provides an `Indexer` trait for pulling torrent feeds from a
//! tracker-indexing service, plus the Jackett/Torznab implementation.

mod feed_parser;
mod jackett;
mod torznab;
mod types;

pub use feed_parser::{parse_feed, FeedError, TORZNAB_NAMESPACE};
pub use jackett::JackettIndexer;
pub use torznab::{validate_categories, TorznabUrlBuilder, ALL_TRACKERS};
pub use types::*;
