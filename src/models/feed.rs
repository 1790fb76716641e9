//! Syndication view models
//!
//! Flat, serialization-ready shapes handed to the Atom and sitemap templates.
//! Nothing here is escaped for XML; templates do that.

use serde::{Deserialize, Serialize};

/// Channel-level metadata of a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    /// Base URL of the site, without trailing slash
    pub domain: String,
    /// Path the feed is served at
    pub path: String,
    pub title: String,
    pub subtitle: String,
    /// URI advertised in the `<generator>` element
    pub generator_uri: String,
}

impl ChannelMeta {
    /// Canonical URL of the feed itself
    pub fn canonical_url(&self) -> String {
        format!("{}{}", self.domain, self.path)
    }
}

/// Author of a feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedAuthor {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One entry of a feed, derived from a publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Publication id, percent-escaped for use as a path segment
    pub id: String,
    /// Absolute URL of the publication page
    pub url: String,
    pub title: String,
    pub summary: String,
    /// RFC 3339
    pub published: String,
    /// RFC 3339
    pub updated: String,
    pub author: FeedAuthor,
    /// Tag display names
    pub tags: Vec<String>,
}

/// Complete feed: channel metadata plus ordered entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub channel: ChannelMeta,
    /// Canonical URL, also used as the feed id
    pub url: String,
    /// Latest update across the entries, RFC 3339
    pub updated: String,
    pub entries: Vec<FeedEntry>,
}

/// One `<url>` of a sitemap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapUrl {
    pub loc: String,
    /// RFC 3339, when known
    pub lastmod: Option<String>,
}

/// Sitemap of the public surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapDocument {
    pub urls: Vec<SitemapUrl>,
}
