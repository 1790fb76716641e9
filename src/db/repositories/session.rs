//! Session repository
//!
//! Sessions are issued elsewhere; this crate only checks them. The repository is
//! the store-backed [`Authenticator`] used by the admin gate.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{bounded, Backend, DynDatabasePool};
use crate::error::ContentError;
use crate::models::format_timestamp;

/// Authenticated editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub author_id: String,
    pub name: String,
}

/// Resolves a session token into a principal.
///
/// `Ok(None)` means the token is unknown or expired.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Option<Principal>, ContentError>;
}

/// SQLx-based session lookup
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
    query_timeout: Duration,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Create a boxed authenticator for use with dependency injection
    pub fn boxed(pool: DynDatabasePool, query_timeout: Duration) -> Arc<dyn Authenticator> {
        Arc::new(Self::new(pool, query_timeout))
    }
}

#[async_trait]
impl Authenticator for SqlxSessionRepository {
    async fn authenticate(&self, token: &str) -> Result<Option<Principal>, ContentError> {
        if token.is_empty() {
            return Ok(None);
        }

        let now = Utc::now().naive_utc();
        bounded(self.query_timeout, "authenticate session", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => find_principal_sqlite(pool, token, &now).await,
                Backend::Mysql(pool) => find_principal_mysql(pool, token, &now).await,
            }
        })
        .await
    }
}

const PRINCIPAL_SQL: &str = r#"
    SELECT a.id AS author_id, a.name AS name
    FROM sessions s
    JOIN authors a ON a.id = s.author_id
    WHERE s.token = ? AND s.expires_at > ?
"#;

async fn find_principal_sqlite(
    pool: &SqlitePool,
    token: &str,
    now: &NaiveDateTime,
) -> Result<Option<Principal>, ContentError> {
    let row = sqlx::query(PRINCIPAL_SQL)
        .bind(token)
        .bind(format_timestamp(now))
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(Principal {
            author_id: row.try_get("author_id")?,
            name: row.try_get("name")?,
        })),
        None => Ok(None),
    }
}

async fn find_principal_mysql(
    pool: &MySqlPool,
    token: &str,
    now: &NaiveDateTime,
) -> Result<Option<Principal>, ContentError> {
    let row = sqlx::query(PRINCIPAL_SQL)
        .bind(token)
        .bind(*now)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(Principal {
            author_id: row.try_get("author_id")?,
            name: row.try_get("name")?,
        })),
        None => Ok(None),
    }
}
