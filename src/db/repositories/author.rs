//! Author repository
//!
//! Authors are reference data; this repository only reads them.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{bounded, Backend, DynDatabasePool};
use crate::error::ContentError;
use crate::models::Author;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// All authors, ordered by name
    async fn list(&self) -> Result<Vec<Author>, ContentError>;

    /// Get author by id
    async fn get_by_id(&self, id: &str) -> Result<Author, ContentError>;
}

/// SQLx-based author repository implementation
pub struct SqlxAuthorRepository {
    pool: DynDatabasePool,
    query_timeout: Duration,
}

impl SqlxAuthorRepository {
    pub fn new(pool: DynDatabasePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool, query_timeout: Duration) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool, query_timeout))
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn list(&self) -> Result<Vec<Author>, ContentError> {
        bounded(self.query_timeout, "list authors", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => list_authors_sqlite(pool).await,
                Backend::Mysql(pool) => list_authors_mysql(pool).await,
            }
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Author, ContentError> {
        let found = bounded(self.query_timeout, "get author", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => get_author_by_id_sqlite(pool, id).await,
                Backend::Mysql(pool) => get_author_by_id_mysql(pool, id).await,
            }
        })
        .await?;

        found.ok_or_else(|| ContentError::NotFound(format!("author '{}'", id)))
    }
}

const AUTHOR_COLUMNS: &str = "id, name, email, role, bio, website_url, website_title";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_authors_sqlite(pool: &SqlitePool) -> Result<Vec<Author>, ContentError> {
    let sql = format!("SELECT {} FROM authors ORDER BY name, id", AUTHOR_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(row_to_author_sqlite).collect()
}

async fn get_author_by_id_sqlite(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Author>, ContentError> {
    let sql = format!("SELECT {} FROM authors WHERE id = ?", AUTHOR_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(row_to_author_sqlite).transpose()
}

fn row_to_author_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Author, ContentError> {
    Ok(Author {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: row.try_get("role")?,
        bio: row.try_get("bio")?,
        website_url: row.try_get("website_url")?,
        website_title: row.try_get("website_title")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_authors_mysql(pool: &MySqlPool) -> Result<Vec<Author>, ContentError> {
    let sql = format!("SELECT {} FROM authors ORDER BY name, id", AUTHOR_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(row_to_author_mysql).collect()
}

async fn get_author_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Author>, ContentError> {
    let sql = format!("SELECT {} FROM authors WHERE id = ?", AUTHOR_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(row_to_author_mysql).transpose()
}

fn row_to_author_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Author, ContentError> {
    Ok(Author {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: row.try_get("role")?,
        bio: row.try_get("bio")?,
        website_url: row.try_get("website_url")?,
        website_title: row.try_get("website_title")?,
    })
}
