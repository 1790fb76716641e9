//! Services layer
//!
//! Content retrieval logic sitting between the repositories and the HTTP
//! handlers:
//! - visibility filtering and freshness resolution over collections
//! - feed and sitemap assembly
//! - search term sanitizing
//! - public and admin publication reads

pub mod feed;
pub mod freshness;
pub mod markdown;
pub mod publication;
pub mod search;
pub mod sitemap;
pub mod visibility;

pub use feed::{build_feed, build_feed_with_tag_lookup, escape_entry_id, FeedService};
pub use freshness::latest_update;
pub use markdown::render_markdown;
pub use publication::PublicationService;
pub use search::{sanitize_term, SearchService};
pub use sitemap::build_sitemap;
pub use visibility::{current_time, filter_public, filter_public_now};
