//! Feed assembler
//!
//! Maps a visibility-filtered publication collection into a [`FeedDocument`].
//! Three flavors share the mapping: latest posts, tag-scoped and author-scoped.
//!
//! Any malformed date fails the whole build. An empty collection fails with
//! `EmptyCollection`, since a feed has no meaningful "updated" without entries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::db::repositories::{AuthorRepository, PublicationRepository, TagRepository};
use crate::error::ContentError;
use crate::models::{
    to_rfc3339, ChannelMeta, FeedAuthor, FeedDocument, FeedEntry, Publication,
    PublicationCollection, PublicationOrder,
};
use crate::services::freshness::latest_update;
use crate::services::visibility::filter_public_now;

/// Percent-escape a publication id for use as a URI path segment
pub fn escape_entry_id(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Build a feed whose entry tags are the display names already on each publication
pub fn build_feed(
    channel: ChannelMeta,
    collection: &PublicationCollection,
) -> Result<FeedDocument, ContentError> {
    assemble(channel, collection, |publication| {
        Ok(publication.tags.iter().map(|t| t.name.clone()).collect())
    })
}

/// Build a feed whose entry tags are resolved from ids through `tag_names`.
///
/// An id missing from the table is `MalformedTagData`.
pub fn build_feed_with_tag_lookup(
    channel: ChannelMeta,
    collection: &PublicationCollection,
    tag_names: &HashMap<String, String>,
) -> Result<FeedDocument, ContentError> {
    assemble(channel, collection, |publication| {
        publication
            .tag_ids()
            .map(|id| {
                tag_names
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ContentError::MalformedTagData {
                        publication_id: publication.id.clone(),
                        detail: format!("unknown tag id '{}'", id),
                    })
            })
            .collect()
    })
}

fn assemble<F>(
    channel: ChannelMeta,
    collection: &PublicationCollection,
    tags_of: F,
) -> Result<FeedDocument, ContentError>
where
    F: Fn(&Publication) -> Result<Vec<String>, ContentError>,
{
    let updated = to_rfc3339(&latest_update(collection)?);

    let entries = collection
        .iter()
        .map(|publication| feed_entry(&channel.domain, publication, tags_of(publication)?))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedDocument {
        url: channel.canonical_url(),
        updated,
        entries,
        channel,
    })
}

fn feed_entry(
    domain: &str,
    publication: &Publication,
    tags: Vec<String>,
) -> Result<FeedEntry, ContentError> {
    let updated = publication.updated_at()?;
    // Drafts only reach a feed through an unfiltered collection; they carry their update date
    let published = match publication.published_at() {
        Some(parsed) => parsed?,
        None => updated,
    };
    let id = escape_entry_id(&publication.id);

    Ok(FeedEntry {
        url: format!("{}/post/{}", domain, id),
        id,
        title: publication.title.clone(),
        summary: publication.summary.clone(),
        published: to_rfc3339(&published),
        updated: to_rfc3339(&updated),
        author: FeedAuthor {
            id: publication.author.id.clone(),
            name: publication.author.name.clone(),
            email: publication.author.email.clone(),
        },
        tags,
    })
}

/// Builds the site's feeds from the repositories
pub struct FeedService {
    publications: Arc<dyn PublicationRepository>,
    tags: Arc<dyn TagRepository>,
    authors: Arc<dyn AuthorRepository>,
    site: SiteConfig,
}

impl FeedService {
    pub fn new(
        publications: Arc<dyn PublicationRepository>,
        tags: Arc<dyn TagRepository>,
        authors: Arc<dyn AuthorRepository>,
        site: SiteConfig,
    ) -> Self {
        Self {
            publications,
            tags,
            authors,
            site,
        }
    }

    /// Latest public posts, served at `/atom.xml`
    pub async fn latest_feed(&self) -> Result<FeedDocument, ContentError> {
        let public = filter_public_now(self.publications.list_all_recent_first().await?);
        let channel = self
            .site
            .channel("/atom.xml", &self.site.title, &self.site.subtitle);
        build_feed(channel, &public)
    }

    /// Public posts carrying a tag; the channel is titled with the tag name
    pub async fn tag_feed(&self, tag_id: &str) -> Result<FeedDocument, ContentError> {
        let tag = self.tags.get_by_id(tag_id).await?;
        let public = filter_public_now(
            self.publications
                .list_by_tag(&tag.id, PublicationOrder::RecentFirst)
                .await?,
        );
        let path = format!("/tags/{}/atom.xml", escape_entry_id(&tag.id));
        build_feed(self.site.channel(&path, &tag.name, ""), &public)
    }

    /// Public posts by an author; entry tags are resolved through one lookup table
    pub async fn author_feed(&self, author_id: &str) -> Result<FeedDocument, ContentError> {
        let author = self.authors.get_by_id(author_id).await?;
        let tag_names = self.tags.name_lookup().await?;
        let public = filter_public_now(
            self.publications
                .list_by_author(&author.id, PublicationOrder::RecentFirst)
                .await?,
        );
        let path = format!("/authors/{}/atom.xml", escape_entry_id(&author.id));
        build_feed_with_tag_lookup(self.site.channel(&path, &author.name, ""), &public, &tag_names)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::fixtures::publication;
    use proptest::prelude::*;

    fn channel() -> ChannelMeta {
        ChannelMeta {
            domain: "https://example.org".to_string(),
            path: "/atom.xml".to_string(),
            title: "Feed".to_string(),
            subtitle: String::new(),
            generator_uri: String::new(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn feed_has_one_escaped_entry_per_item(ids in prop::collection::vec("\\PC{1,24}", 1..12)) {
            let collection: PublicationCollection = ids
                .iter()
                .map(|id| publication(id, Some("2024-01-01 00:00:00"), "2024-01-01 00:00:00", &[]))
                .collect();

            let feed = build_feed(channel(), &collection).unwrap();
            prop_assert_eq!(feed.entries.len(), ids.len());

            for (entry, id) in feed.entries.iter().zip(&ids) {
                prop_assert!(!entry.id.contains('/'));
                prop_assert!(!entry.id.contains(' '));
                let decoded = urlencoding::decode(&entry.id).unwrap();
                prop_assert_eq!(decoded.as_ref(), id.as_str());
            }
        }
    }
}
