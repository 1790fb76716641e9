//! Sitemap builder
//!
//! Lists the public surface: home, public posts with their last update, tags
//! and authors.

use crate::config::SiteConfig;
use crate::error::ContentError;
use crate::models::{
    to_rfc3339, Author, PublicationCollection, SitemapDocument, SitemapUrl, Tag,
};
use crate::services::feed::escape_entry_id;

/// Build the sitemap from an already visibility-filtered collection.
///
/// A malformed `updated_at` fails the build, as it does for feeds.
pub fn build_sitemap(
    site: &SiteConfig,
    public: &PublicationCollection,
    tags: &[Tag],
    authors: &[Author],
) -> Result<SitemapDocument, ContentError> {
    let mut urls = vec![SitemapUrl {
        loc: site.canonical("/"),
        lastmod: None,
    }];

    for publication in public {
        urls.push(SitemapUrl {
            loc: site.canonical(&format!("/post/{}", escape_entry_id(&publication.id))),
            lastmod: Some(to_rfc3339(&publication.updated_at()?)),
        });
    }

    urls.extend(tags.iter().map(|tag| SitemapUrl {
        loc: site.canonical(&format!("/tags/{}", escape_entry_id(&tag.id))),
        lastmod: None,
    }));

    urls.extend(authors.iter().map(|author| SitemapUrl {
        loc: site.canonical(&format!("/authors/{}", escape_entry_id(&author.id))),
        lastmod: None,
    }));

    Ok(SitemapDocument { urls })
}
