//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the service traits, allowing
//! the sync loops to be exercised without a running Jackett or Tribler.
//!
//! # Example
//!
//! ```rust,ignore
//! use channelfeed_core::testing::{fixtures, MockChannelClient, MockIndexer};
//!
//! let indexer = MockIndexer::new();
//! let channel = MockChannelClient::new();
//!
//! indexer.set_feed("rarbg", fixtures::feed_items(3)).await;
//! ```

mod mock_channel;
mod mock_indexer;

pub use mock_channel::MockChannelClient;
pub use mock_indexer::MockIndexer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::indexer::FeedItem;

    /// `n` distinct magnet feed items keyed by a fake 40-char info hash.
    pub fn feed_items(n: usize) -> Vec<FeedItem> {
        (0..n)
            .map(|i| {
                let hash = format!("{:040x}", i + 1);
                FeedItem::new(hash.clone(), format!("magnet:?xt=urn:btih:{}", hash))
            })
            .collect()
    }

    /// One Torznab `<item>` carrying infohash and magneturl attributes.
    pub fn torznab_item(title: &str, info_hash: &str, magnet: &str) -> String {
        format!(
            r#"    <item>
      <title>{}</title>
      <guid>{}</guid>
      <torznab:attr name="seeders" value="10"/>
      <torznab:attr name="infohash" value="{}"/>
      <torznab:attr name="magneturl" value="{}"/>
    </item>
"#,
            escape(title),
            escape(info_hash),
            escape(info_hash),
            escape(magnet)
        )
    }

    /// A complete Torznab RSS document wrapping `items`.
    pub fn torznab_feed(items: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:torznab="http://torznab.com/schemas/2015/feed">
  <channel>
    <title>Jackett</title>
    <description>Jackett feed</description>
{}  </channel>
</rss>
"#,
            items.concat()
        )
    }

    /// Torznab document built from feed items (key used as title and info hash).
    pub fn torznab_feed_for(items: &[FeedItem]) -> String {
        let rendered: Vec<String> = items
            .iter()
            .map(|item| torznab_item(&item.key, &item.key, &item.link))
            .collect();
        torznab_feed(&rendered)
    }

    fn escape(raw: &str) -> String {
        raw.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}
