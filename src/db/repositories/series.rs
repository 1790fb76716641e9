//! Series repository

use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{bounded, Backend, DynDatabasePool};
use crate::error::ContentError;
use crate::models::Series;

/// Series repository trait
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Get series by id
    async fn get_by_id(&self, id: &str) -> Result<Series, ContentError>;
}

/// SQLx-based series repository implementation
pub struct SqlxSeriesRepository {
    pool: DynDatabasePool,
    query_timeout: Duration,
}

impl SqlxSeriesRepository {
    pub fn new(pool: DynDatabasePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn boxed(pool: DynDatabasePool, query_timeout: Duration) -> Arc<dyn SeriesRepository> {
        Arc::new(Self::new(pool, query_timeout))
    }
}

#[async_trait]
impl SeriesRepository for SqlxSeriesRepository {
    async fn get_by_id(&self, id: &str) -> Result<Series, ContentError> {
        let found = bounded(self.query_timeout, "get series", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => get_series_sqlite(pool, id).await,
                Backend::Mysql(pool) => get_series_mysql(pool, id).await,
            }
        })
        .await?;

        found.ok_or_else(|| ContentError::NotFound(format!("series '{}'", id)))
    }
}

async fn get_series_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Series>, ContentError> {
    let row = sqlx::query("SELECT id, title FROM series WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(Series {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
        })),
        None => Ok(None),
    }
}

async fn get_series_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Series>, ContentError> {
    let row = sqlx::query("SELECT id, title FROM series WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(Series {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{seed_scenario, setup_pool};

    #[tokio::test]
    async fn test_get_series_by_id() {
        let pool = setup_pool().await;
        seed_scenario(&pool).await;
        let repo = SqlxSeriesRepository::new(pool, Duration::from_secs(5));

        assert_eq!(repo.get_by_id("intro").await.unwrap().title, "Introduction");
        assert!(repo.get_by_id("outro").await.unwrap_err().is_not_found());
    }
}
