//! Tag repository
//!
//! Read access to tags for tag-browse pages, tag feed titles and the author feed
//! tag-name lookup.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::db::{bounded, Backend, DynDatabasePool};
use crate::error::ContentError;
use crate::models::Tag;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags, ordered by name
    async fn list(&self) -> Result<Vec<Tag>, ContentError>;

    /// Get tag by id
    async fn get_by_id(&self, id: &str) -> Result<Tag, ContentError>;

    /// Tag id → display name table
    async fn name_lookup(&self) -> Result<HashMap<String, String>, ContentError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|tag| (tag.id, tag.name))
            .collect())
    }
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
    query_timeout: Duration,
}

impl SqlxTagRepository {
    pub fn new(pool: DynDatabasePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool, query_timeout: Duration) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool, query_timeout))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, ContentError> {
        bounded(self.query_timeout, "list tags", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => list_tags_sqlite(pool).await,
                Backend::Mysql(pool) => list_tags_mysql(pool).await,
            }
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Tag, ContentError> {
        let found = bounded(self.query_timeout, "get tag", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => get_tag_by_id_sqlite(pool, id).await,
                Backend::Mysql(pool) => get_tag_by_id_mysql(pool, id).await,
            }
        })
        .await?;

        found.ok_or_else(|| ContentError::NotFound(format!("tag '{}'", id)))
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_tags_sqlite(pool: &SqlitePool) -> Result<Vec<Tag>, ContentError> {
    let rows = sqlx::query("SELECT id, name FROM tags ORDER BY name, id")
        .fetch_all(pool)
        .await?;

    let mut tags = Vec::with_capacity(rows.len());
    for row in rows {
        tags.push(Tag::new(
            row.try_get::<String, _>("id")?,
            row.try_get::<String, _>("name")?,
        ));
    }
    Ok(tags)
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Tag>, ContentError> {
    let row = sqlx::query("SELECT id, name FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(Tag::new(
            row.try_get::<String, _>("id")?,
            row.try_get::<String, _>("name")?,
        ))),
        None => Ok(None),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_tags_mysql(pool: &MySqlPool) -> Result<Vec<Tag>, ContentError> {
    let rows = sqlx::query("SELECT id, name FROM tags ORDER BY name, id")
        .fetch_all(pool)
        .await?;

    let mut tags = Vec::with_capacity(rows.len());
    for row in rows {
        tags.push(Tag::new(
            row.try_get::<String, _>("id")?,
            row.try_get::<String, _>("name")?,
        ));
    }
    Ok(tags)
}

async fn get_tag_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Tag>, ContentError> {
    let row = sqlx::query("SELECT id, name FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(Tag::new(
            row.try_get::<String, _>("id")?,
            row.try_get::<String, _>("name")?,
        ))),
        None => Ok(None),
    }
}
