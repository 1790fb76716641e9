//! Syndication endpoints
//!
//! Atom feeds for the whole site, a tag and an author, plus the sitemap. A feed
//! with no public entries is a 404 rather than a feed without an update time.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, PageError};
use crate::models::FeedDocument;
use crate::services::build_sitemap;

pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/atom.xml", get(latest_feed))
        .route("/tags/{id}/atom.xml", get(tag_feed))
        .route("/authors/{id}/atom.xml", get(author_feed))
        .route("/sitemap.xml", get(sitemap))
}

fn render_feed(state: &AppState, feed: &FeedDocument) -> Result<Response, PageError> {
    let mut context = TeraContext::new();
    context.insert("feed", feed);
    let body = state.renderer.render("atom.xml", &context)?;
    Ok(([(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)], body).into_response())
}

/// GET /atom.xml
pub async fn latest_feed(State(state): State<AppState>) -> Result<Response, PageError> {
    let feed = state.feed_service.latest_feed().await?;
    render_feed(&state, &feed)
}

/// GET /tags/{id}/atom.xml
pub async fn tag_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let feed = state.feed_service.tag_feed(&id).await?;
    render_feed(&state, &feed)
}

/// GET /authors/{id}/atom.xml
pub async fn author_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let feed = state.feed_service.author_feed(&id).await?;
    render_feed(&state, &feed)
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> Result<Response, PageError> {
    let service = &state.publication_service;
    let public = service.recent_public().await?;
    let tags = service.tags().await?;
    let authors = service.authors().await?;

    let sitemap = build_sitemap(&state.site, &public, &tags, &authors)?;

    let mut context = TeraContext::new();
    context.insert("sitemap", &sitemap);
    let body = state.renderer.render("sitemap.xml", &context)?;
    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response())
}
