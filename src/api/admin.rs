//! Admin read endpoints
//!
//! JSON views for editors, behind the session gate. Drafts and scheduled posts
//! are visible here.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedEditor};
use crate::models::{Publication, PublicationCollection};

/// Response for the post listing
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub total: usize,
    pub posts: PublicationCollection,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
}

/// GET /admin/posts - every post, oldest first, drafts included
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(editor): Extension<AuthenticatedEditor>,
) -> Result<Json<PostListResponse>, ApiError> {
    let posts = state.publication_service.admin_list().await?;
    tracing::debug!("{} listed {} posts", editor.0.author_id, posts.len());

    Ok(Json(PostListResponse {
        total: posts.len(),
        posts,
    }))
}

/// GET /admin/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Publication>, ApiError> {
    Ok(Json(state.publication_service.admin_post(&id).await?))
}
