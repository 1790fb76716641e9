//! Search engine
//!
//! Sanitizes the visitor's query and delegates to the repository. A multi-word
//! query stays a single substring: words are not matched independently.

use std::sync::Arc;

use crate::db::repositories::PublicationRepository;
use crate::error::ContentError;
use crate::models::PublicationCollection;

/// Trim and collapse internal whitespace runs into single spaces
pub fn sanitize_term(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct SearchService {
    publications: Arc<dyn PublicationRepository>,
}

impl SearchService {
    pub fn new(publications: Arc<dyn PublicationRepository>) -> Self {
        Self { publications }
    }

    /// Public search. A blank query returns nothing without touching the store.
    pub async fn search(&self, raw: &str) -> Result<PublicationCollection, ContentError> {
        let term = sanitize_term(raw);
        if term.is_empty() {
            return Ok(PublicationCollection::default());
        }

        tracing::debug!("Search for {:?}", term);
        self.publications.search(&term, true).await
    }
}
