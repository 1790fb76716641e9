//! Publication repository
//!
//! Read-only queries producing `Publication` and `PublicationCollection` values.
//!
//! This module provides:
//! - `PublicationRepository` trait defining the read contract
//! - `SqlxPublicationRepository` implementing it for SQLite and MySQL
//!
//! Every query uses a structured LEFT JOIN returning one row per (publication, tag)
//! pair; consecutive rows of the same publication are folded through
//! [`TagAggregator`]. Search matches in memory so case folding covers all of
//! Unicode, not only ASCII. Every store round-trip is bounded by the configured
//! query timeout.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{bounded, Backend, DynDatabasePool};
use crate::error::ContentError;
use crate::models::{
    normalize_published_at, Author, Publication, PublicationCollection, PublicationOrder,
    TagAggregator,
};

/// Maximum number of search results
pub const SEARCH_LIMIT: usize = 10;

/// Publication repository trait
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Every publication, drafts included, in the given order
    async fn list_all(&self, order: PublicationOrder) -> Result<PublicationCollection, ContentError>;

    /// Get a publication with its body.
    ///
    /// With `require_public`, a publication that is not public is reported exactly
    /// like a missing one.
    async fn get_by_id(&self, id: &str, require_public: bool) -> Result<Publication, ContentError>;

    /// Case-insensitive literal substring match over title, summary and body,
    /// newest first, at most [`SEARCH_LIMIT`] items
    async fn search(&self, term: &str, public_only: bool)
        -> Result<PublicationCollection, ContentError>;

    /// Administrative listing: oldest first
    async fn list_all_chronological(&self) -> Result<PublicationCollection, ContentError> {
        self.list_all(PublicationOrder::Chronological).await
    }

    /// Public listing: newest first
    async fn list_all_recent_first(&self) -> Result<PublicationCollection, ContentError> {
        self.list_all(PublicationOrder::RecentFirst).await
    }

    async fn list_by_author(
        &self,
        author_id: &str,
        order: PublicationOrder,
    ) -> Result<PublicationCollection, ContentError> {
        if author_id.is_empty() {
            return Ok(PublicationCollection::default());
        }
        Ok(self.list_all(order).await?.by_author(author_id))
    }

    async fn list_by_tag(
        &self,
        tag_id: &str,
        order: PublicationOrder,
    ) -> Result<PublicationCollection, ContentError> {
        if tag_id.is_empty() {
            return Ok(PublicationCollection::default());
        }
        Ok(self.list_all(order).await?.by_tag(tag_id))
    }

    async fn list_by_series(
        &self,
        series_id: &str,
        order: PublicationOrder,
    ) -> Result<PublicationCollection, ContentError> {
        if series_id.is_empty() {
            return Ok(PublicationCollection::default());
        }
        Ok(self.list_all(order).await?.by_series(series_id))
    }
}

/// SQLx-based publication repository implementation
pub struct SqlxPublicationRepository {
    pool: DynDatabasePool,
    query_timeout: Duration,
}

impl SqlxPublicationRepository {
    pub fn new(pool: DynDatabasePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool, query_timeout: Duration) -> Arc<dyn PublicationRepository> {
        Arc::new(Self::new(pool, query_timeout))
    }
}

#[async_trait]
impl PublicationRepository for SqlxPublicationRepository {
    async fn list_all(&self, order: PublicationOrder) -> Result<PublicationCollection, ContentError> {
        tracing::debug!("Listing publications ({:?})", order);
        let rows = bounded(self.query_timeout, "list publications", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => list_rows_sqlite(pool, order, false).await,
                Backend::Mysql(pool) => list_rows_mysql(pool, order, false).await,
            }
        })
        .await?;
        fold_joined_rows(rows)
    }

    async fn get_by_id(&self, id: &str, require_public: bool) -> Result<Publication, ContentError> {
        let rows = bounded(self.query_timeout, "get publication", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => get_rows_sqlite(pool, id).await,
                Backend::Mysql(pool) => get_rows_mysql(pool, id).await,
            }
        })
        .await?;

        let publication = fold_joined_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id))?;

        if require_public && !publication.is_public_at(&Utc::now().naive_utc()) {
            return Err(not_found(id));
        }

        Ok(publication)
    }

    async fn search(
        &self,
        term: &str,
        public_only: bool,
    ) -> Result<PublicationCollection, ContentError> {
        let needle = term.to_lowercase();
        let now = Utc::now().naive_utc();
        tracing::debug!("Searching publications for {:?}", needle);

        let rows = bounded(self.query_timeout, "search publications", async {
            match self.pool.backend() {
                Backend::Sqlite(pool) => {
                    list_rows_sqlite(pool, PublicationOrder::RecentFirst, true).await
                }
                Backend::Mysql(pool) => {
                    list_rows_mysql(pool, PublicationOrder::RecentFirst, true).await
                }
            }
        })
        .await?;

        // Visibility before the cap, so hidden rows never take a result slot
        Ok(fold_joined_rows(rows)?
            .into_iter()
            .filter(|p| !public_only || p.is_public_at(&now))
            .filter(|p| matches_term(p, &needle))
            .take(SEARCH_LIMIT)
            .map(|mut p| {
                p.body = None;
                p
            })
            .collect())
    }
}

fn not_found(id: &str) -> ContentError {
    ContentError::NotFound(format!("publication '{}'", id))
}

/// Literal match of an already lowercased term against title, summary and body
fn matches_term(publication: &Publication, needle: &str) -> bool {
    let haystack = format!(
        "{} {} {}",
        publication.title,
        publication.summary,
        publication.body.as_deref().unwrap_or_default()
    );
    haystack.to_lowercase().contains(needle)
}

fn order_direction(order: PublicationOrder) -> &'static str {
    match order {
        PublicationOrder::Chronological => "ASC",
        PublicationOrder::RecentFirst => "DESC",
    }
}

// ============================================================================
// Row folding
// ============================================================================

/// One row of the publication × tag join
#[derive(Debug)]
struct JoinedRow {
    id: String,
    published_at: Option<String>,
    updated_at: String,
    title: String,
    summary: String,
    body: Option<String>,
    cover_alt: String,
    series_id: Option<String>,
    author: Option<Author>,
    tag_id: Option<String>,
    tag_name: Option<String>,
}

impl JoinedRow {
    fn to_publication(&self) -> Result<Publication, ContentError> {
        let author = self.author.clone().ok_or_else(|| {
            ContentError::MalformedRow(format!("publication '{}' has no author row", self.id))
        })?;

        Ok(Publication {
            id: self.id.clone(),
            published_at: normalize_published_at(self.published_at.clone()),
            updated_at: self.updated_at.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            body: self.body.clone(),
            cover_alt: self.cover_alt.clone(),
            author,
            series_id: self.series_id.clone(),
            tags: Vec::new(),
        })
    }
}

/// Fold rows ordered by publication into one `Publication` each
fn fold_joined_rows(rows: Vec<JoinedRow>) -> Result<PublicationCollection, ContentError> {
    let mut items = Vec::new();
    let mut current: Option<(Publication, TagAggregator)> = None;

    for row in rows {
        let continues = matches!(&current, Some((p, _)) if p.id == row.id);
        if !continues {
            if let Some((mut publication, tags)) = current.take() {
                publication.tags = tags.finish();
                items.push(publication);
            }
            current = Some((row.to_publication()?, TagAggregator::new(&row.id)));
        }

        if let Some((_, tags)) = current.as_mut() {
            tags.push(row.tag_id.as_deref(), row.tag_name.as_deref())?;
        }
    }

    if let Some((mut publication, tags)) = current {
        publication.tags = tags.finish();
        items.push(publication);
    }

    Ok(PublicationCollection::new(items))
}

const JOINS: &str = r#"
    LEFT JOIN authors a ON a.id = p.author_id
    LEFT JOIN publication_tags pt ON pt.publication_id = p.id
    LEFT JOIN tags t ON t.id = pt.tag_id
"#;

fn body_column(with_body: bool) -> &'static str {
    if with_body {
        ", p.body"
    } else {
        ""
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const SQLITE_LIST_COLUMNS: &str = r#"
    p.id, p.published_at, p.updated_at, p.title, p.summary, p.cover_alt, p.series_id,
    a.id AS author_id, a.name AS author_name, a.email AS author_email, a.role AS author_role,
    a.bio AS author_bio, a.website_url AS author_website_url,
    a.website_title AS author_website_title,
    pt.tag_id AS tag_id, t.name AS tag_name
"#;

/// Drafts (NULL or empty date) last and tied among themselves, then date, then id
fn sqlite_order_by(order: PublicationOrder) -> String {
    format!(
        "ORDER BY (p.published_at IS NULL OR p.published_at = ''), \
         NULLIF(p.published_at, '') {}, p.id, pt.tag_id",
        order_direction(order)
    )
}

fn author_from_sqlite(row: &SqliteRow) -> Result<Option<Author>, ContentError> {
    let id: Option<String> = row.try_get("author_id")?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(Author {
        id,
        name: row.try_get::<Option<String>, _>("author_name")?.unwrap_or_default(),
        email: row.try_get::<Option<String>, _>("author_email")?.unwrap_or_default(),
        role: row.try_get::<Option<String>, _>("author_role")?.unwrap_or_default(),
        bio: row.try_get::<Option<String>, _>("author_bio")?.unwrap_or_default(),
        website_url: row.try_get("author_website_url")?,
        website_title: row.try_get("author_website_title")?,
    }))
}

fn joined_row_from_sqlite(row: &SqliteRow, with_body: bool) -> Result<JoinedRow, ContentError> {
    let body = if with_body {
        Some(row.try_get("body")?)
    } else {
        None
    };

    Ok(JoinedRow {
        id: row.try_get("id")?,
        published_at: row.try_get("published_at")?,
        updated_at: row.try_get("updated_at")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        body,
        cover_alt: row.try_get("cover_alt")?,
        series_id: row.try_get("series_id")?,
        author: author_from_sqlite(row)?,
        tag_id: row.try_get("tag_id")?,
        tag_name: row.try_get("tag_name")?,
    })
}

async fn list_rows_sqlite(
    pool: &SqlitePool,
    order: PublicationOrder,
    with_body: bool,
) -> Result<Vec<JoinedRow>, ContentError> {
    let sql = format!(
        "SELECT {}{} FROM publications p {} {}",
        SQLITE_LIST_COLUMNS,
        body_column(with_body),
        JOINS,
        sqlite_order_by(order)
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter()
        .map(|row| joined_row_from_sqlite(row, with_body))
        .collect()
}

async fn get_rows_sqlite(pool: &SqlitePool, id: &str) -> Result<Vec<JoinedRow>, ContentError> {
    let sql = format!(
        "SELECT {}{} FROM publications p {} WHERE p.id = ? ORDER BY pt.tag_id",
        SQLITE_LIST_COLUMNS,
        body_column(true),
        JOINS
    );

    let rows = sqlx::query(&sql).bind(id).fetch_all(pool).await?;
    rows.iter().map(|row| joined_row_from_sqlite(row, true)).collect()
}

// ============================================================================
// MySQL implementations
// ============================================================================

const MYSQL_LIST_COLUMNS: &str = r#"
    p.id,
    DATE_FORMAT(p.published_at, '%Y-%m-%d %H:%i:%s') AS published_at,
    DATE_FORMAT(p.updated_at, '%Y-%m-%d %H:%i:%s') AS updated_at,
    p.title, p.summary, p.cover_alt, p.series_id,
    a.id AS author_id, a.name AS author_name, a.email AS author_email, a.role AS author_role,
    a.bio AS author_bio, a.website_url AS author_website_url,
    a.website_title AS author_website_title,
    pt.tag_id AS tag_id, t.name AS tag_name
"#;

fn author_from_mysql(row: &MySqlRow) -> Result<Option<Author>, ContentError> {
    let id: Option<String> = row.try_get("author_id")?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(Author {
        id,
        name: row.try_get::<Option<String>, _>("author_name")?.unwrap_or_default(),
        email: row.try_get::<Option<String>, _>("author_email")?.unwrap_or_default(),
        role: row.try_get::<Option<String>, _>("author_role")?.unwrap_or_default(),
        bio: row.try_get::<Option<String>, _>("author_bio")?.unwrap_or_default(),
        website_url: row.try_get("author_website_url")?,
        website_title: row.try_get("author_website_title")?,
    }))
}

fn joined_row_from_mysql(row: &MySqlRow, with_body: bool) -> Result<JoinedRow, ContentError> {
    let body = if with_body {
        Some(row.try_get("body")?)
    } else {
        None
    };

    Ok(JoinedRow {
        id: row.try_get("id")?,
        published_at: row.try_get("published_at")?,
        updated_at: row.try_get("updated_at")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        body,
        cover_alt: row.try_get("cover_alt")?,
        series_id: row.try_get("series_id")?,
        author: author_from_mysql(row)?,
        tag_id: row.try_get("tag_id")?,
        tag_name: row.try_get("tag_name")?,
    })
}

// DATETIME columns cannot hold an empty string, so NULL alone marks a draft
async fn list_rows_mysql(
    pool: &MySqlPool,
    order: PublicationOrder,
    with_body: bool,
) -> Result<Vec<JoinedRow>, ContentError> {
    let sql = format!(
        "SELECT {}{} FROM publications p {} \
         ORDER BY (p.published_at IS NULL), p.published_at {}, p.id, pt.tag_id",
        MYSQL_LIST_COLUMNS,
        body_column(with_body),
        JOINS,
        order_direction(order)
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter()
        .map(|row| joined_row_from_mysql(row, with_body))
        .collect()
}

async fn get_rows_mysql(pool: &MySqlPool, id: &str) -> Result<Vec<JoinedRow>, ContentError> {
    let sql = format!(
        "SELECT {}{} FROM publications p {} WHERE p.id = ? ORDER BY pt.tag_id",
        MYSQL_LIST_COLUMNS,
        body_column(true),
        JOINS
    );

    let rows = sqlx::query(&sql).bind(id).fetch_all(pool).await?;
    rows.iter().map(|row| joined_row_from_mysql(row, true)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{
        insert_publication, seed_scenario, setup_pool, NewPublication,
    };
    use crate::models::Tag;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxPublicationRepository) {
        let pool = setup_pool().await;
        let repo = SqlxPublicationRepository::new(pool.clone(), Duration::from_secs(5));
        (pool, repo)
    }

    #[tokio::test]
    async fn test_list_all_chronological_puts_drafts_last() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let all = repo.list_all_chronological().await.unwrap();
        assert_eq!(all.ids(), vec!["p1", "p3", "p2"]);
    }

    #[tokio::test]
    async fn test_list_all_recent_first() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let all = repo.list_all_recent_first().await.unwrap();
        assert_eq!(all.ids(), vec!["p3", "p1", "p2"]);
    }

    #[tokio::test]
    async fn test_list_all_aggregates_tags_in_id_order() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let all = repo.list_all_chronological().await.unwrap();
        let p1 = &all.as_slice()[0];
        assert_eq!(
            p1.tags,
            vec![Tag::new("go", "Go"), Tag::new("web", "Web")]
        );
        assert!(p1.body.is_none());
        assert_eq!(p1.author.name, "Ariel");
    }

    #[tokio::test]
    async fn test_publication_without_tags_has_empty_tag_list() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let all = repo.list_all_chronological().await.unwrap();
        let p2 = all.iter().find(|p| p.id == "p2").unwrap();
        assert!(p2.tags.is_empty());
        assert!(p2.is_draft());
    }

    #[tokio::test]
    async fn test_list_by_tag() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let go = repo
            .list_by_tag("go", PublicationOrder::Chronological)
            .await
            .unwrap();
        assert_eq!(go.ids(), vec!["p1", "p3"]);

        let none = repo
            .list_by_tag("rust", PublicationOrder::Chronological)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_author_with_empty_id_matches_nothing() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let by_ariel = repo
            .list_by_author("ariel", PublicationOrder::RecentFirst)
            .await
            .unwrap();
        assert_eq!(by_ariel.ids(), vec!["p3", "p1", "p2"]);

        let by_nobody = repo
            .list_by_author("", PublicationOrder::RecentFirst)
            .await
            .unwrap();
        assert!(by_nobody.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_series() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let intro = repo
            .list_by_series("intro", PublicationOrder::Chronological)
            .await
            .unwrap();
        assert_eq!(intro.ids(), vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_get_by_id_includes_body_and_tags() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let p1 = repo.get_by_id("p1", true).await.unwrap();
        assert_eq!(p1.body.as_deref(), Some("First body about go"));
        assert_eq!(p1.tags, vec![Tag::new("go", "Go"), Tag::new("web", "Web")]);
        assert_eq!(p1.series_id.as_deref(), Some("intro"));
    }

    #[tokio::test]
    async fn test_get_draft_by_id() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let hidden = repo.get_by_id("p2", true).await.unwrap_err();
        assert!(matches!(hidden, ContentError::NotFound(_)));

        let draft = repo.get_by_id("p2", false).await.unwrap();
        assert_eq!(draft.id, "p2");
        assert!(draft.tags.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_and_private_look_the_same() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let missing = repo.get_by_id("nope", true).await.unwrap_err().to_string();
        let private = repo.get_by_id("p2", true).await.unwrap_err().to_string();
        assert_eq!(missing.replace("nope", "X"), private.replace("p2", "X"));
    }

    #[tokio::test]
    async fn test_get_future_publication_requires_admin() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some("2999-01-01 00:00:00"),
                ..NewPublication::new("later")
            },
        )
        .await;

        assert!(repo.get_by_id("later", true).await.unwrap_err().is_not_found());
        assert!(repo.get_by_id("later", false).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_publication_date_is_a_draft() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some(""),
                ..NewPublication::new("blank")
            },
        )
        .await;

        let blank = repo.get_by_id("blank", false).await.unwrap();
        assert!(blank.is_draft());
        assert!(repo.get_by_id("blank", true).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_publication_date_sorts_with_drafts() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some(""),
                ..NewPublication::new("blank")
            },
        )
        .await;

        let chronological = repo.list_all_chronological().await.unwrap();
        assert_eq!(chronological.ids(), vec!["p1", "p3", "blank", "p2"]);

        let recent = repo.list_all_recent_first().await.unwrap();
        assert_eq!(recent.ids(), vec!["p3", "p1", "blank", "p2"]);
    }

    #[tokio::test]
    async fn test_get_by_id_keeps_tag_names_with_commas() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        sqlx::query("INSERT INTO tags (id, name) VALUES ('cpp', 'C, C++')")
            .execute(pool.as_sqlite().unwrap())
            .await
            .unwrap();
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some("2024-02-01 00:00:00"),
                tags: &["go", "cpp"],
                ..NewPublication::new("cpost")
            },
        )
        .await;

        let post = repo.get_by_id("cpost", true).await.unwrap();
        assert_eq!(
            post.tags,
            vec![Tag::new("cpp", "C, C++"), Tag::new("go", "Go")]
        );
        assert_eq!(post.body.as_deref(), Some("Plain text."));

        let listed = repo.list_all_chronological().await.unwrap();
        let from_list = listed.iter().find(|p| p.id == "cpost").unwrap();
        assert_eq!(from_list.tags, post.tags);
    }

    #[tokio::test]
    async fn test_dangling_tag_association_is_malformed() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        let sqlite = pool.as_sqlite().unwrap();

        let mut conn = sqlite.acquire().await.unwrap();
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO publication_tags (publication_id, tag_id) VALUES ('p3', 'ghost')")
            .execute(&mut *conn)
            .await
            .unwrap();
        drop(conn);

        let err = repo.list_all_chronological().await.unwrap_err();
        assert!(matches!(err, ContentError::MalformedTagData { .. }));

        let err = repo.get_by_id("p3", false).await.unwrap_err();
        assert!(matches!(err, ContentError::MalformedTagData { .. }));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let found = repo.search("GOLANG", true).await.unwrap();
        assert_eq!(found.ids(), vec!["p3"]);
    }

    #[tokio::test]
    async fn test_search_does_not_tokenize() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some("2024-02-01 00:00:00"),
                title: "A golang primer",
                body: "This tutorial covers the basics.",
                ..NewPublication::new("split")
            },
        )
        .await;

        let found = repo.search("golang tutorial", true).await.unwrap();
        assert!(found.is_empty());

        assert_eq!(repo.search("golang primer", true).await.unwrap().ids(), vec!["split"]);
    }

    #[tokio::test]
    async fn test_search_public_only_hides_drafts() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        assert!(repo.search("unfinished", true).await.unwrap().is_empty());
        assert_eq!(repo.search("unfinished", false).await.unwrap().ids(), vec!["p2"]);
    }

    #[tokio::test]
    async fn test_search_matches_wildcards_literally() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some("2024-03-01 00:00:00"),
                title: "Growth of 100% in a year",
                ..NewPublication::new("percent")
            },
        )
        .await;

        assert_eq!(repo.search("100%", true).await.unwrap().ids(), vec!["percent"]);
        assert!(repo.search("_", true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_capped_and_recent_first() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let mut ids = Vec::new();
        for day in 1..=12 {
            ids.push(format!("bulk-{:02}", day));
        }
        for (idx, id) in ids.iter().enumerate() {
            let published = format!("2023-01-{:02} 00:00:00", idx + 1);
            insert_publication(
                &pool,
                NewPublication {
                    published_at: Some(&published),
                    title: "Bulk entry",
                    ..NewPublication::new(id)
                },
            )
            .await;
        }

        let found = repo.search("bulk entry", true).await.unwrap();
        assert_eq!(found.len(), SEARCH_LIMIT);
        assert_eq!(found.as_slice()[0].id, "bulk-12");
        assert_eq!(found.as_slice()[9].id, "bulk-03");
    }

    #[tokio::test]
    async fn test_search_results_keep_their_tags() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        let found = repo.search("first body", true).await.unwrap();
        assert_eq!(found.ids(), vec!["p1"]);
        assert_eq!(found.as_slice()[0].tags.len(), 2);
        assert!(found.as_slice()[0].body.is_none());
    }

    #[tokio::test]
    async fn test_search_folds_accented_case() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;
        insert_publication(
            &pool,
            NewPublication {
                published_at: Some("2024-02-01 00:00:00"),
                title: "Éxito en Vigo",
                ..NewPublication::new("exito")
            },
        )
        .await;

        assert_eq!(repo.search("éxito", true).await.unwrap().ids(), vec!["exito"]);
        assert_eq!(repo.search("ÉXITO EN", true).await.unwrap().ids(), vec!["exito"]);
    }

    #[tokio::test]
    async fn test_search_cap_counts_only_public_matches() {
        let (pool, repo) = setup_test_repo().await;
        seed_scenario(&pool).await;

        for (id, published) in [("odd-1", "yesterday"), ("odd-2", "someday soon")] {
            insert_publication(
                &pool,
                NewPublication {
                    published_at: Some(published),
                    title: "Bulk entry",
                    ..NewPublication::new(id)
                },
            )
            .await;
        }
        let ids: Vec<String> = (1..=11).map(|n| format!("bulk-{:02}", n)).collect();
        for (idx, id) in ids.iter().enumerate() {
            let published = format!("2023-01-{:02} 00:00:00", idx + 1);
            insert_publication(
                &pool,
                NewPublication {
                    published_at: Some(&published),
                    title: "Bulk entry",
                    ..NewPublication::new(id)
                },
            )
            .await;
        }

        let found = repo.search("bulk entry", true).await.unwrap();
        assert_eq!(found.len(), SEARCH_LIMIT);
        assert!(found.iter().all(|p| p.id.starts_with("bulk-")));
        assert_eq!(found.as_slice()[0].id, "bulk-11");
    }

    #[test]
    fn test_matches_term_folds_unicode_case() {
        let publication = Publication {
            title: "ÑANDÚ".to_string(),
            summary: String::new(),
            body: Some("Straße".to_string()),
            ..crate::models::fixtures::publication("nandu", None, "2024-01-01 00:00:00", &[])
        };

        assert!(matches_term(&publication, "ñandú"));
        assert!(matches_term(&publication, "straße"));
        assert!(!matches_term(&publication, "nandu"));
    }

    #[test]
    fn test_fold_rejects_missing_author() {
        let row = JoinedRow {
            id: "orphan".to_string(),
            published_at: None,
            updated_at: "2024-01-01 00:00:00".to_string(),
            title: String::new(),
            summary: String::new(),
            body: None,
            cover_alt: String::new(),
            series_id: None,
            author: None,
            tag_id: None,
            tag_name: None,
        };

        let err = fold_joined_rows(vec![row]).unwrap_err();
        assert!(matches!(err, ContentError::MalformedRow(_)));
    }
}
