//! Torznab feed parser - extracts torrent links from Jackett RSS responses.
//!
//! Each `<item>` is keyed by its `torznab:attr name="infohash"` value, falling
//! back to `<title>`. The link is the `torznab:attr name="magneturl"` value,
//! falling back to `<link>`. Items missing either are dropped.
//!
//! Jackett reports request failures as a `<error code=".." description=".."/>`
//! document, often with HTTP 200. That root element becomes `FeedError::Torznab`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use thiserror::Error;

use super::FeedItem;

/// Namespace URI bound to the `torznab:` prefix in Jackett feeds.
pub const TORZNAB_NAMESPACE: &[u8] = b"http://torznab.com/schemas/2015/feed";

/// Errors that can occur when parsing a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Document ended inside <{0}>")]
    Truncated(String),

    #[error("Torznab error {code}: {description}")]
    Torznab { code: String, description: String },
}

/// Parse a Torznab RSS document into feed items, in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedItem>, FeedError> {
    // Text is kept verbatim so mixed text and CDATA concatenate; fields are trimmed on build
    let mut reader = NsReader::from_reader(xml);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    // Local names of the currently open elements
    let mut open: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut current_item: Option<FeedItemBuilder> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                if !saw_root && is_error_root(&e) {
                    return Err(torznab_error(&e)?);
                }
                saw_root = true;
                let name = local_name(&e);

                if name == "item" {
                    current_item = Some(FeedItemBuilder::default());
                } else if let Some(ref mut item) = current_item {
                    if is_torznab_attr(&ns, &e) {
                        item.apply_attr(&e)?;
                    }
                }

                open.push(name);
            }
            Ok((ns, Event::Empty(e))) => {
                if !saw_root && is_error_root(&e) {
                    return Err(torznab_error(&e)?);
                }
                saw_root = true;

                // <torznab:attr name="..." value="..."/> is always self-closing
                if let Some(ref mut item) = current_item {
                    if is_torznab_attr(&ns, &e) {
                        item.apply_attr(&e)?;
                    }
                }
            }
            Ok((_, Event::End(_))) => {
                if open.pop().as_deref() == Some("item") {
                    if let Some(builder) = current_item.take() {
                        if let Some(item) = builder.build() {
                            items.push(item);
                        }
                    }
                }
            }
            Ok((_, Event::Text(e))) => {
                if let Some(ref mut item) = current_item {
                    let text = e
                        .unescape()
                        .map_err(|e| FeedError::Parse(e.to_string()))?;
                    item.apply_text(open.last().map(String::as_str), &text);
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(ref mut item) = current_item {
                    let text = String::from_utf8_lossy(&e);
                    item.apply_text(open.last().map(String::as_str), &text);
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(FeedError::Parse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.pop() {
        return Err(FeedError::Truncated(unclosed));
    }
    if !saw_root {
        return Err(FeedError::NoRootElement);
    }

    Ok(items)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_error_root(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"error"
}

/// Build the error reported by a Torznab `<error>` document.
fn torznab_error(e: &BytesStart<'_>) -> Result<FeedError, FeedError> {
    let mut code = String::new();
    let mut description = String::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| FeedError::Parse(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| FeedError::Parse(e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"code" => code = value,
            b"description" => description = value,
            _ => {}
        }
    }

    Ok(FeedError::Torznab { code, description })
}

fn is_torznab_attr(ns: &ResolveResult<'_>, e: &BytesStart<'_>) -> bool {
    if e.local_name().as_ref() != b"attr" {
        return false;
    }
    match ns {
        ResolveResult::Bound(Namespace(uri)) => *uri == TORZNAB_NAMESPACE,
        // Some indexers forget the xmlns declaration
        _ => e.name().as_ref() == b"torznab:attr",
    }
}

#[derive(Default)]
struct FeedItemBuilder {
    info_hash: Option<String>,
    title: String,
    magnet_url: Option<String>,
    link: String,
}

impl FeedItemBuilder {
    fn apply_attr(&mut self, e: &BytesStart<'_>) -> Result<(), FeedError> {
        let mut name = None;
        let mut value = None;

        for attr in e.attributes() {
            let attr = attr.map_err(|e| FeedError::Parse(e.to_string()))?;
            let unescaped = attr
                .unescape_value()
                .map_err(|e| FeedError::Parse(e.to_string()))?;
            match attr.key.as_ref() {
                b"name" => name = Some(unescaped.into_owned()),
                b"value" => value = Some(unescaped.into_owned()),
                _ => {}
            }
        }

        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        // First occurrence wins
        match name.as_deref() {
            Some("infohash") if self.info_hash.is_none() => self.info_hash = Some(value),
            Some("magneturl") if self.magnet_url.is_none() => self.magnet_url = Some(value),
            _ => {}
        }
        Ok(())
    }

    fn apply_text(&mut self, element: Option<&str>, text: &str) {
        match element {
            Some("title") => self.title.push_str(text),
            Some("link") => self.link.push_str(text),
            _ => {}
        }
    }

    fn build(self) -> Option<FeedItem> {
        let key = self.info_hash.or_else(|| non_empty(&self.title))?;
        let link = self.magnet_url.or_else(|| non_empty(&self.link))?;
        Some(FeedItem { key, link })
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_parse_magnet_attributes() {
        let xml = fixtures::torznab_feed(&[
            fixtures::torznab_item("Ubuntu 24.04", "aaaa", "magnet:?xt=urn:btih:aaaa"),
            fixtures::torznab_item("Debian 12", "bbbb", "magnet:?xt=urn:btih:bbbb"),
        ]);

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(
            items,
            vec![
                FeedItem::new("aaaa", "magnet:?xt=urn:btih:aaaa"),
                FeedItem::new("bbbb", "magnet:?xt=urn:btih:bbbb"),
            ]
        );
    }

    #[test]
    fn test_falls_back_to_title_and_link() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:torznab="http://torznab.com/schemas/2015/feed">
  <channel>
    <title>Feed title is not an item</title>
    <item>
      <title>Fedora 40</title>
      <link>http://localhost:9117/dl/fedora.torrent</link>
      <torznab:attr name="seeders" value="12"/>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(
            items,
            vec![FeedItem::new(
                "Fedora 40",
                "http://localhost:9117/dl/fedora.torrent"
            )]
        );
        assert!(!items[0].is_magnet());
    }

    #[test]
    fn test_magnet_attr_preferred_over_link() {
        let xml = r#"<rss xmlns:torznab="http://torznab.com/schemas/2015/feed"><channel>
  <item>
    <title>Arch</title>
    <link>http://localhost:9117/dl/arch.torrent</link>
    <torznab:attr name="magneturl" value="magnet:?xt=urn:btih:cccc&amp;dn=arch"/>
  </item>
</channel></rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "Arch");
        assert_eq!(items[0].link, "magnet:?xt=urn:btih:cccc&dn=arch");
    }

    #[test]
    fn test_items_without_key_or_link_are_dropped() {
        let xml = r#"<rss xmlns:torznab="http://torznab.com/schemas/2015/feed"><channel>
  <item><title>No link here</title></item>
  <item><link>magnet:?xt=urn:btih:dddd</link></item>
  <item>
    <torznab:attr name="infohash" value=""/>
    <title>Kept</title>
    <link>magnet:?xt=urn:btih:eeee</link>
  </item>
</channel></rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(items, vec![FeedItem::new("Kept", "magnet:?xt=urn:btih:eeee")]);
    }

    #[test]
    fn test_cdata_title() {
        let xml = r#"<rss><channel><item>
  <title><![CDATA[ Movie & Co ]]></title>
  <link>magnet:?xt=urn:btih:ffff</link>
</item></channel></rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(items[0].key, "Movie & Co");
    }

    #[test]
    fn test_mixed_text_and_cdata_title() {
        let xml = r#"<rss><channel><item>
  <title>Foo <![CDATA[Bar]]> &amp; Baz</title>
  <link>magnet:?xt=urn:btih:abab</link>
</item></channel></rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(items[0].key, "Foo Bar & Baz");
    }

    #[test]
    fn test_error_document_is_reported() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<error code="100" description="Invalid API Key" />"#;

        match parse_feed(xml.as_bytes()) {
            Err(FeedError::Torznab { code, description }) => {
                assert_eq!(code, "100");
                assert_eq!(description, "Invalid API Key");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_error_element_inside_item_is_not_a_failure() {
        let xml = r#"<rss><channel><item>
  <title>Error 404 (live)</title>
  <error/>
  <link>magnet:?xt=urn:btih:cdcd</link>
</item></channel></rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_undeclared_torznab_prefix() {
        let xml = r#"<rss><channel><item>
  <title>t</title>
  <torznab:attr name="magneturl" value="magnet:?xt=urn:btih:1234"/>
</item></channel></rss>"#;

        let items = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(items[0].link, "magnet:?xt=urn:btih:1234");
    }

    #[test]
    fn test_empty_channel() {
        let xml = fixtures::torznab_feed(&[]);
        assert!(parse_feed(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_end_tag_fails() {
        let xml = "<rss><channel><item><title>x</titel></item></channel></rss>";
        assert!(matches!(
            parse_feed(xml.as_bytes()),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn test_truncated_document_fails() {
        let xml = "<rss><channel><item><title>x</title>";
        assert!(parse_feed(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_non_xml_fails() {
        assert!(matches!(
            parse_feed(b"Unauthorized"),
            Err(FeedError::NoRootElement)
        ));
        assert!(matches!(parse_feed(b""), Err(FeedError::NoRootElement)));
    }
}
