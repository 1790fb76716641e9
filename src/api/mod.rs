//! API layer - HTTP handlers and routing
//!
//! This module contains:
//! - public pages rendered through the theme
//! - Atom feeds and the sitemap
//! - admin read endpoints (JSON, behind the session gate)

pub mod admin;
pub mod feeds;
pub mod middleware;
pub mod public;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedEditor, PageError};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let site_routes = Router::new()
        .merge(public::router())
        .merge(feeds::router())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ));

    Router::new()
        .merge(site_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::db::repositories::test_support::{insert_session, seed_scenario, setup_pool};
    use crate::db::DynDatabasePool;
    use crate::theme::Renderer;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn setup() -> (Router, DynDatabasePool) {
        let pool = setup_pool().await;
        seed_scenario(&pool).await;

        let site = SiteConfig {
            domain: "https://example.org".to_string(),
            ..SiteConfig::default()
        };
        let renderer = Renderer::new().expect("templates should compile");
        let state = AppState::new(pool.clone(), Duration::from_secs(5), site, renderer);
        (build_router(state), pool)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_lists_public_posts_only() {
        let (app, _pool) = setup().await;
        let (status, _, body) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First post"));
        assert!(body.contains("Third post"));
        assert!(!body.contains("Draft post"));
        assert!(body.find("Third post").unwrap() < body.find("First post").unwrap());
    }

    #[tokio::test]
    async fn test_post_page_renders_markdown_body() {
        let (app, _pool) = setup().await;
        let (status, content_type, body) = get(app, "/post/p3").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("Notes on Golang generics"));
    }

    #[tokio::test]
    async fn test_draft_post_is_not_found() {
        let (app, _pool) = setup().await;
        let (status, content_type, body) = get(app, "/post/p2").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("404"));
        assert!(!body.contains("Something unfinished"));
    }

    #[tokio::test]
    async fn test_unknown_tag_is_not_found() {
        let (app, _pool) = setup().await;
        let (status, _, _) = get(app, "/tags/rust").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tag_and_series_pages() {
        let (app, _pool) = setup().await;

        let (status, _, body) = get(app.clone(), "/tags/web").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First post"));
        assert!(!body.contains("Third post"));

        let (status, _, body) = get(app, "/series/intro").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.find("First post").unwrap() < body.find("Third post").unwrap());
    }

    #[tokio::test]
    async fn test_author_page() {
        let (app, _pool) = setup().await;
        let (status, _, body) = get(app, "/authors/ariel").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ariel online"));
        assert!(body.contains("https://ariel.example.org"));
    }

    #[tokio::test]
    async fn test_search_page() {
        let (app, _pool) = setup().await;

        let (status, _, body) = get(app.clone(), "/search?q=golang").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Third post"));
        assert!(!body.contains("First post"));

        let (status, _, body) = get(app, "/search").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Type something to search for."));
    }

    #[tokio::test]
    async fn test_atom_feed() {
        let (app, _pool) = setup().await;
        let (status, content_type, body) = get(app, "/atom.xml").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(feeds::ATOM_CONTENT_TYPE));
        assert!(body.contains("<updated>2024-06-02T10:00:00Z</updated>"));
        assert!(body.contains("https://example.org/post/p3"));
        assert!(!body.contains("https://example.org/post/p2"));
    }

    #[tokio::test]
    async fn test_author_feed_resolves_tag_names() {
        let (app, _pool) = setup().await;
        let (status, content_type, body) = get(app, "/authors/ariel/atom.xml").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(feeds::ATOM_CONTENT_TYPE));
        assert!(body.contains("<title>Ariel</title>"));
        assert!(body.contains("<category term=\"Go\"/>"));
    }

    #[tokio::test]
    async fn test_feed_without_public_posts_is_not_found() {
        let (app, _pool) = setup().await;
        let (status, _, _) = get(app, "/authors/noa/atom.xml").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sitemap() {
        let (app, _pool) = setup().await;
        let (status, _, body) = get(app, "/sitemap.xml").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<loc>https://example.org/post/p1</loc>"));
        assert!(body.contains("<loc>https://example.org/tags/go</loc>"));
        assert!(body.contains("<loc>https://example.org/authors/noa</loc>"));
        assert!(!body.contains("/post/p2"));
    }

    #[tokio::test]
    async fn test_admin_requires_session() {
        let (app, _pool) = setup().await;

        let (status, _, body) = get(app.clone(), "/admin/posts").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));

        let request = Request::builder()
            .uri("/admin/posts")
            .header(header::AUTHORIZATION, "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (app, pool) = setup().await;
        insert_session(&pool, "old", "ariel", "2000-01-01 00:00:00").await;

        let request = Request::builder()
            .uri("/admin/posts")
            .header(header::COOKIE, "session=old")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_lists_drafts() {
        let (app, pool) = setup().await;
        insert_session(&pool, "tok", "ariel", "2999-01-01 00:00:00").await;

        let request = Request::builder()
            .uri("/admin/posts")
            .header(header::AUTHORIZATION, "Bearer tok")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total"], 3);
        let ids: Vec<&str> = json["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["p1", "p3", "p2"]);

        let request = Request::builder()
            .uri("/admin/posts/p2")
            .header(header::COOKIE, "session=tok")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["body"], "Something unfinished");
        assert!(json["published_at"].is_null());
    }

    #[tokio::test]
    async fn test_admin_unknown_post() {
        let (app, pool) = setup().await;
        insert_session(&pool, "tok", "ariel", "2999-01-01 00:00:00").await;

        let request = Request::builder()
            .uri("/admin/posts/missing")
            .header(header::AUTHORIZATION, "Bearer tok")
            .body(Body::empty())
            .unwrap();
        let (status, content_type, _) = send(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(content_type.unwrap().starts_with("application/json"));
    }
}
