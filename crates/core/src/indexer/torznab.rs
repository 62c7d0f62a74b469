//! Torznab request URLs for a Jackett instance.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{IndexerError, TorznabQuery};

/// Tracker name Jackett uses to fan a request out to every configured indexer.
pub const ALL_TRACKERS: &str = "all";

/// A comma separated list of numbers, or the empty string.
static CATEGORY_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(([0-9]+,)*[0-9]+)?$").expect("category regex is valid"));

/// Check that a category filter looks like "2000,5000".
pub fn validate_categories(categories: &str) -> Result<(), IndexerError> {
    if CATEGORY_LIST.is_match(categories) {
        Ok(())
    } else {
        Err(IndexerError::InvalidQuery(format!(
            "categories must be a comma separated list of numbers, got '{}'",
            categories
        )))
    }
}

/// Builds Torznab API URLs against a single Jackett instance.
#[derive(Debug, Clone)]
pub struct TorznabUrlBuilder {
    base_url: String,
    api_key: String,
}

impl TorznabUrlBuilder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Capabilities request for a tracker.
    pub fn caps_url(&self, tracker: &str) -> String {
        self.url("caps", tracker, &[])
    }

    /// Raw feed of a tracker: a search with no phrase or filters.
    pub fn feed_url(&self, tracker: &str) -> String {
        self.url("search", tracker, &[])
    }

    /// Search request carrying every parameter set on `query`.
    pub fn search_url(&self, tracker: &str, query: &TorznabQuery) -> Result<String, IndexerError> {
        if query.is_empty() {
            return Ok(self.feed_url(tracker));
        }

        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(cat) = &query.categories {
            validate_categories(cat)?;
            params.push(("cat", cat.clone()));
        }
        if let Some(maxage) = query.max_age_days {
            params.push(("maxage", maxage.to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }

        Ok(self.url("search", tracker, &params))
    }

    fn url(&self, query_type: &str, tracker: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/{}/results/torznab/api?t={}&apikey={}",
            self.base_url,
            urlencoding::encode(tracker),
            query_type,
            urlencoding::encode(&self.api_key)
        );

        for (name, value) in params {
            url.push_str(&format!("&{}={}", name, urlencoding::encode(value)));
        }

        url
    }
}
