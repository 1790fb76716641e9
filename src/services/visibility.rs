//! Visibility filter
//!
//! Narrows a collection to publicly visible items: publication date set and not
//! in the future. Administrative listings skip this step.

use chrono::{NaiveDateTime, Utc};

use crate::models::PublicationCollection;

/// Current time in the same (UTC, naive) frame as stored timestamps
pub fn current_time() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Keep the items that are public at `now`, preserving order
pub fn filter_public(collection: PublicationCollection, now: &NaiveDateTime) -> PublicationCollection {
    collection.retain_where(|p| p.is_public_at(now))
}

/// [`filter_public`] at the current time
pub fn filter_public_now(collection: PublicationCollection) -> PublicationCollection {
    filter_public(collection, &current_time())
}
