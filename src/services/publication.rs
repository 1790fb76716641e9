//! Publication read service
//!
//! Public reads apply the visibility filter; admin reads see drafts and
//! scheduled posts. Reference data for browse pages comes along here so the
//! handlers only talk to services.

use std::sync::Arc;

use crate::db::repositories::{
    AuthorRepository, PublicationRepository, SeriesRepository, TagRepository,
};
use crate::error::ContentError;
use crate::models::{Author, Publication, PublicationCollection, PublicationOrder, Series, Tag};
use crate::services::visibility::filter_public_now;

pub struct PublicationService {
    publications: Arc<dyn PublicationRepository>,
    tags: Arc<dyn TagRepository>,
    authors: Arc<dyn AuthorRepository>,
    series: Arc<dyn SeriesRepository>,
}

impl PublicationService {
    pub fn new(
        publications: Arc<dyn PublicationRepository>,
        tags: Arc<dyn TagRepository>,
        authors: Arc<dyn AuthorRepository>,
        series: Arc<dyn SeriesRepository>,
    ) -> Self {
        Self {
            publications,
            tags,
            authors,
            series,
        }
    }

    /// Public posts, newest first
    pub async fn recent_public(&self) -> Result<PublicationCollection, ContentError> {
        Ok(filter_public_now(
            self.publications.list_all_recent_first().await?,
        ))
    }

    /// A public post with its body
    pub async fn public_post(&self, id: &str) -> Result<Publication, ContentError> {
        self.publications.get_by_id(id, true).await
    }

    /// Tag and its public posts, newest first
    pub async fn tag_page(&self, tag_id: &str) -> Result<(Tag, PublicationCollection), ContentError> {
        let tag = self.tags.get_by_id(tag_id).await?;
        let posts = self
            .publications
            .list_by_tag(&tag.id, PublicationOrder::RecentFirst)
            .await?;
        Ok((tag, filter_public_now(posts)))
    }

    /// Author and their public posts, newest first
    pub async fn author_page(
        &self,
        author_id: &str,
    ) -> Result<(Author, PublicationCollection), ContentError> {
        let author = self.authors.get_by_id(author_id).await?;
        let posts = self
            .publications
            .list_by_author(&author.id, PublicationOrder::RecentFirst)
            .await?;
        Ok((author, filter_public_now(posts)))
    }

    /// Series and its public posts, oldest first so the series reads in order
    pub async fn series_page(
        &self,
        series_id: &str,
    ) -> Result<(Series, PublicationCollection), ContentError> {
        let series = self.series.get_by_id(series_id).await?;
        let posts = self
            .publications
            .list_by_series(&series.id, PublicationOrder::Chronological)
            .await?;
        Ok((series, filter_public_now(posts)))
    }

    pub async fn tags(&self) -> Result<Vec<Tag>, ContentError> {
        self.tags.list().await
    }

    pub async fn authors(&self) -> Result<Vec<Author>, ContentError> {
        self.authors.list().await
    }

    /// Every post including drafts, oldest first
    pub async fn admin_list(&self) -> Result<PublicationCollection, ContentError> {
        self.publications.list_all_chronological().await
    }

    /// Any post by id, public or not
    pub async fn admin_post(&self, id: &str) -> Result<Publication, ContentError> {
        self.publications.get_by_id(id, false).await
    }
}
