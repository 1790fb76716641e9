//! Error taxonomy for content retrieval and feed assembly
//!
//! Repository failures propagate unchanged to the calling boundary, which decides
//! status codes. Nothing here retries or substitutes default data.

use thiserror::Error;

/// Errors produced while reading publications and deriving feeds from them
#[derive(Debug, Error)]
pub enum ContentError {
    /// Connectivity or query-execution failure, including query timeouts
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A row could not be decoded (missing required column, type mismatch)
    #[error("Malformed row: {0}")]
    MalformedRow(String),

    /// Tag id/name data for a publication does not pair up
    #[error("Malformed tag data for '{publication_id}': {detail}")]
    MalformedTagData {
        publication_id: String,
        detail: String,
    },

    /// No matching entity, or the entity is not public when publicness is required
    #[error("Not found: {0}")]
    NotFound(String),

    /// A timestamp does not match `YYYY-MM-DD HH:MM:SS`
    #[error("Invalid date '{value}' on publication '{publication_id}'")]
    DateParse {
        publication_id: String,
        value: String,
    },

    /// A derived value was requested over an empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),
}

impl ContentError {
    /// True for failures that should surface as "not found" to visitors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::NotFound(_) | ContentError::EmptyCollection(_)
        )
    }
}

impl From<sqlx::Error> for ContentError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ContentError::NotFound("no matching row".to_string()),
            sqlx::Error::ColumnNotFound(column) => {
                ContentError::MalformedRow(format!("missing column '{}'", column))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                ContentError::MalformedRow(format!("column {}: {}", index, source))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                ContentError::MalformedRow(format!("column index {} out of {}", index, len))
            }
            sqlx::Error::Decode(source) => ContentError::MalformedRow(source.to_string()),
            other => ContentError::StoreUnavailable(other.to_string()),
        }
    }
}
