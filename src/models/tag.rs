//! Tag model and tag aggregation
//!
//! Storage gives no ordering guarantee for the tags of a publication, so every
//! path that builds a tag list goes through [`TagAggregator`], which fixes the
//! order (by id) and removes duplicates introduced by joins.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Tag value object: a stable slug plus its display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Slug identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Collects already-paired `(id, name)` values for one publication.
///
/// Rows come from a LEFT JOIN, so a publication without tags contributes a single
/// `(None, None)` pair, which is skipped.
#[derive(Debug)]
pub struct TagAggregator {
    publication_id: String,
    tags: Vec<Tag>,
}

impl TagAggregator {
    pub fn new(publication_id: impl Into<String>) -> Self {
        Self {
            publication_id: publication_id.into(),
            tags: Vec::new(),
        }
    }

    /// Add one joined pair. A half-present pair or an empty component is malformed.
    pub fn push(&mut self, id: Option<&str>, name: Option<&str>) -> Result<(), ContentError> {
        match (id, name) {
            (None, None) => Ok(()),
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => {
                self.tags.push(Tag::new(id, name));
                Ok(())
            }
            (id, name) => Err(ContentError::MalformedTagData {
                publication_id: self.publication_id.clone(),
                detail: format!("unpaired tag id {:?} / name {:?}", id, name),
            }),
        }
    }

    /// Finish with tags sorted by id, duplicates removed
    pub fn finish(mut self) -> Vec<Tag> {
        self.tags.sort_by(|a, b| a.id.cmp(&b.id));
        self.tags.dedup_by(|a, b| a.id == b.id);
        self.tags
    }
}

/// Split the two parallel comma-joined strings of a grouped join into tags.
///
/// An empty pair of strings means "no tags" and yields an empty list rather than a
/// single empty tag. Segment counts must match; a mismatch is reported instead of
/// truncating.
pub fn split_grouped_tags(
    publication_id: &str,
    raw_ids: &str,
    raw_names: &str,
) -> Result<Vec<Tag>, ContentError> {
    if raw_ids.is_empty() && raw_names.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = raw_ids.split(',').collect();
    let names: Vec<&str> = raw_names.split(',').collect();

    if ids.len() != names.len() {
        return Err(ContentError::MalformedTagData {
            publication_id: publication_id.to_string(),
            detail: format!("{} tag ids but {} tag names", ids.len(), names.len()),
        });
    }

    let mut aggregator = TagAggregator::new(publication_id);
    for (id, name) in ids.into_iter().zip(names) {
        aggregator.push(Some(id), Some(name))?;
    }

    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_yield_no_tags() {
        let tags = split_grouped_tags("p1", "", "").unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_split_pairs_ids_with_names() {
        let tags = split_grouped_tags("p1", "web,go", "Web,Go").unwrap();
        assert_eq!(tags, vec![Tag::new("go", "Go"), Tag::new("web", "Web")]);
    }

    #[test]
    fn test_split_single_tag() {
        let tags = split_grouped_tags("p1", "go", "Go").unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Go");
    }

    #[test]
    fn test_mismatched_segment_counts_are_malformed() {
        let err = split_grouped_tags("p1", "go,web", "Go").unwrap_err();
        match err {
            ContentError::MalformedTagData {
                publication_id,
                detail,
            } => {
                assert_eq!(publication_id, "p1");
                assert!(detail.contains("2 tag ids but 1 tag names"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_ids_without_names_are_malformed() {
        // "" splits into one empty segment, matching the single name segment
        assert!(split_grouped_tags("p1", "", "Go").is_err());
        assert!(split_grouped_tags("p1", "go", "").is_err());
    }

    #[test]
    fn test_aggregator_skips_null_pairs() {
        let mut agg = TagAggregator::new("p1");
        agg.push(None, None).unwrap();
        assert!(agg.finish().is_empty());
    }

    #[test]
    fn test_aggregator_rejects_half_pairs() {
        let mut agg = TagAggregator::new("p1");
        assert!(agg.push(Some("go"), None).is_err());
        assert!(agg.push(None, Some("Go")).is_err());
    }

    #[test]
    fn test_aggregator_sorts_and_dedups() {
        let mut agg = TagAggregator::new("p1");
        agg.push(Some("web"), Some("Web")).unwrap();
        agg.push(Some("go"), Some("Go")).unwrap();
        agg.push(Some("web"), Some("Web")).unwrap();

        let tags = agg.finish();
        let ids: Vec<&str> = tags.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["go", "web"]);
    }
}
