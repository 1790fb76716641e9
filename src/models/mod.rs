//! Data models
//!
//! Entities read from the store (Author, Tag, Series, Publication) and the view
//! models derived from them (PublicationCollection, FeedDocument, SitemapDocument).
//! Every shape here is flat and serialization-ready, with no store handles inside.

mod author;
mod feed;
mod publication;
mod series;
mod tag;

pub use author::Author;
pub use feed::{ChannelMeta, FeedAuthor, FeedDocument, FeedEntry, SitemapDocument, SitemapUrl};
pub use publication::{
    format_timestamp, normalize_published_at, parse_timestamp, Publication,
    PublicationCollection, PublicationOrder, to_rfc3339, TIMESTAMP_FORMAT,
};
pub use series::Series;
pub use tag::{split_grouped_tags, Tag, TagAggregator};

#[cfg(test)]
pub(crate) use publication::fixtures;
