//! Public pages
//!
//! Server-rendered pages over the public surface. Every listing goes through the
//! visibility filter in the services; a draft or scheduled post is a 404 here.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, PageError};

/// Query string of `/search`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/post/{id}", get(post))
        .route("/tags", get(tags))
        .route("/tags/{id}", get(tag))
        .route("/authors", get(authors))
        .route("/authors/{id}", get(author))
        .route("/series/{id}", get(series))
        .route("/search", get(search))
}

fn base_context(state: &AppState) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("site", state.site.as_ref());
    context
}

fn render(state: &AppState, template: &str, context: &TeraContext) -> Result<Html<String>, PageError> {
    Ok(Html(state.renderer.render(template, context)?))
}

/// GET / - recent public posts
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let posts = state.publication_service.recent_public().await?;

    let mut context = base_context(&state);
    context.insert("posts", &posts);
    render(&state, "index.html", &context)
}

/// GET /post/{id}
pub async fn post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let post = state.publication_service.public_post(&id).await?;

    let mut context = base_context(&state);
    context.insert("post", &post);
    render(&state, "post.html", &context)
}

/// GET /tags
pub async fn tags(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let tags = state.publication_service.tags().await?;

    let mut context = base_context(&state);
    context.insert("tags", &tags);
    render(&state, "tags.html", &context)
}

/// GET /tags/{id}
pub async fn tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let (tag, posts) = state.publication_service.tag_page(&id).await?;

    let mut context = base_context(&state);
    context.insert("tag", &tag);
    context.insert("posts", &posts);
    render(&state, "tag.html", &context)
}

/// GET /authors
pub async fn authors(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let authors = state.publication_service.authors().await?;

    let mut context = base_context(&state);
    context.insert("authors", &authors);
    render(&state, "authors.html", &context)
}

/// GET /authors/{id}
pub async fn author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let (author, posts) = state.publication_service.author_page(&id).await?;

    let mut context = base_context(&state);
    context.insert("author", &author);
    context.insert("posts", &posts);
    render(&state, "author.html", &context)
}

/// GET /series/{id}
pub async fn series(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let (series, posts) = state.publication_service.series_page(&id).await?;

    let mut context = base_context(&state);
    context.insert("series", &series);
    context.insert("posts", &posts);
    render(&state, "series.html", &context)
}

/// GET /search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, PageError> {
    let posts = state.search_service.search(&query.q).await?;

    let mut context = base_context(&state);
    context.insert("query", query.q.trim());
    context.insert("posts", &posts);
    render(&state, "search.html", &context)
}
