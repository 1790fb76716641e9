//! Freshness resolver
//!
//! The latest update across a collection is the "last updated" of a feed
//! channel. A corrupted timestamp is an error, never skipped.

use chrono::NaiveDateTime;

use crate::error::ContentError;
use crate::models::PublicationCollection;

/// Maximum `updated_at` over the collection.
///
/// Fails with `EmptyCollection` when there is nothing to compare and with
/// `DateParse` naming the first item whose timestamp does not parse.
pub fn latest_update(collection: &PublicationCollection) -> Result<NaiveDateTime, ContentError> {
    let mut latest: Option<NaiveDateTime> = None;

    for publication in collection {
        let updated = publication.updated_at()?;
        latest = Some(match latest {
            Some(current) if current >= updated => current,
            _ => updated,
        });
    }

    latest.ok_or_else(|| {
        ContentError::EmptyCollection("no publications to compute the latest update from".into())
    })
}
