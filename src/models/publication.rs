//! Publication model
//!
//! This module provides:
//! - `Publication`, the denormalized view of an article with its author and tags
//! - `PublicationCollection`, an ordered sequence of publications
//! - `PublicationOrder`, the two listing policies
//! - helpers for the fixed `YYYY-MM-DD HH:MM:SS` timestamp pattern
//!
//! Timestamps are kept as the strings the store returns. They are parsed where a
//! decision depends on them (visibility, freshness, feeds) so a corrupted value is
//! reported at that point with the id of the publication that carries it.

use chrono::{NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use super::{Author, Tag};
use crate::error::ContentError;

/// Pattern of every timestamp stored for a publication
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a stored timestamp
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
}

/// Format a timestamp in the stored pattern
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// RFC 3339 rendering of a stored (UTC) timestamp, as used by feeds and sitemaps
pub fn to_rfc3339(value: &NaiveDateTime) -> String {
    value.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Listing order policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicationOrder {
    /// Oldest publication date first (administrative listing)
    #[default]
    Chronological,
    /// Newest publication date first (public listing and search)
    RecentFirst,
}

/// Article entity with its author snapshot and tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Unique slug identifier
    pub id: String,
    /// Publication timestamp; `None` means draft
    pub published_at: Option<String>,
    /// Last update timestamp (always set)
    pub updated_at: String,
    pub title: String,
    pub summary: String,
    /// Markdown body, only loaded for single-item retrieval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Alt text of the cover image
    pub cover_alt: String,
    /// Author snapshot at query time
    pub author: Author,
    #[serde(default)]
    pub series_id: Option<String>,
    /// Tags ordered by id
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Publication {
    /// Parsed publication date; `None` for drafts
    pub fn published_at(&self) -> Option<Result<NaiveDateTime, ContentError>> {
        self.published_at.as_deref().map(|value| {
            parse_timestamp(value).map_err(|_| ContentError::DateParse {
                publication_id: self.id.clone(),
                value: value.to_string(),
            })
        })
    }

    /// Parsed last-update date
    pub fn updated_at(&self) -> Result<NaiveDateTime, ContentError> {
        parse_timestamp(&self.updated_at).map_err(|_| ContentError::DateParse {
            publication_id: self.id.clone(),
            value: self.updated_at.clone(),
        })
    }

    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }

    /// Public iff the publication date is set, parses, and is not after `now`.
    ///
    /// An unparseable publication date is logged and counts as not public.
    pub fn is_public_at(&self, now: &NaiveDateTime) -> bool {
        match self.published_at() {
            None => false,
            Some(Ok(published)) => published <= *now,
            Some(Err(err)) => {
                tracing::warn!("{}; treating publication as not public", err);
                false
            }
        }
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    pub fn tag_ids(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.id.as_str())
    }
}

/// Treat an empty stored publication date the same as NULL
pub fn normalize_published_at(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Ordered sequence of publications
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationCollection(Vec<Publication>);

impl PublicationCollection {
    pub fn new(items: Vec<Publication>) -> Self {
        Self(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Publication> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Publication] {
        &self.0
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.id.as_str()).collect()
    }

    /// Keep the items matching `predicate`, preserving order
    pub fn retain_where<F>(self, predicate: F) -> Self
    where
        F: FnMut(&Publication) -> bool,
    {
        Self(self.0.into_iter().filter(predicate).collect())
    }

    /// Items written by `author_id`. An empty id matches nothing.
    pub fn by_author(self, author_id: &str) -> Self {
        if author_id.is_empty() {
            return Self::default();
        }
        self.retain_where(|p| p.author.id == author_id)
    }

    /// Items carrying the tag `tag_id`
    pub fn by_tag(self, tag_id: &str) -> Self {
        if tag_id.is_empty() {
            return Self::default();
        }
        self.retain_where(|p| p.has_tag(tag_id))
    }

    /// Items belonging to the series `series_id`
    pub fn by_series(self, series_id: &str) -> Self {
        if series_id.is_empty() {
            return Self::default();
        }
        self.retain_where(|p| p.series_id.as_deref() == Some(series_id))
    }
}

impl From<Vec<Publication>> for PublicationCollection {
    fn from(items: Vec<Publication>) -> Self {
        Self(items)
    }
}

impl FromIterator<Publication> for PublicationCollection {
    fn from_iter<I: IntoIterator<Item = Publication>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PublicationCollection {
    type Item = Publication;
    type IntoIter = std::vec::IntoIter<Publication>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PublicationCollection {
    type Item = &'a Publication;
    type IntoIter = std::slice::Iter<'a, Publication>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
