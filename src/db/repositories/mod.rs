//! Database repositories
//!
//! Read-only repository implementations. Each repository dispatches on the
//! backend and bounds every round-trip with the configured query timeout.

pub mod author;
pub mod publication;
pub mod series;
pub mod session;
pub mod tag;

pub use author::{AuthorRepository, SqlxAuthorRepository};
pub use publication::{PublicationRepository, SqlxPublicationRepository, SEARCH_LIMIT};
pub use series::{SeriesRepository, SqlxSeriesRepository};
pub use session::{Authenticator, Principal, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
