//! HTTP plumbing shared by every handler
//!
//! Contains:
//! - `AppState`, the services handed to the handlers
//! - `PageError` and `ApiError`, the failure shapes of the HTML and JSON surfaces
//! - `require_auth`, the session gate in front of the admin routes
//! - `render_error_pages`, which turns page failures into themed HTML

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::db::repositories::{
    Authenticator, Principal, SqlxAuthorRepository, SqlxPublicationRepository,
    SqlxSeriesRepository, SqlxSessionRepository, SqlxTagRepository,
};
use crate::db::DynDatabasePool;
use crate::error::ContentError;
use crate::services::{FeedService, PublicationService, SearchService};
use crate::theme::{Renderer, ThemeError};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub publication_service: Arc<PublicationService>,
    pub feed_service: Arc<FeedService>,
    pub search_service: Arc<SearchService>,
    pub authenticator: Arc<dyn Authenticator>,
    pub renderer: Arc<Renderer>,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Wire the store-backed repositories into the services
    pub fn new(
        pool: DynDatabasePool,
        query_timeout: Duration,
        site: SiteConfig,
        renderer: Renderer,
    ) -> Self {
        let publications = SqlxPublicationRepository::boxed(pool.clone(), query_timeout);
        let tags = SqlxTagRepository::boxed(pool.clone(), query_timeout);
        let authors = SqlxAuthorRepository::boxed(pool.clone(), query_timeout);
        let series = SqlxSeriesRepository::boxed(pool.clone(), query_timeout);

        Self {
            publication_service: Arc::new(PublicationService::new(
                publications.clone(),
                tags.clone(),
                authors.clone(),
                series,
            )),
            feed_service: Arc::new(FeedService::new(
                publications.clone(),
                tags,
                authors,
                site.clone(),
            )),
            search_service: Arc::new(SearchService::new(publications)),
            authenticator: SqlxSessionRepository::boxed(pool, query_timeout),
            renderer: Arc::new(renderer),
            site: Arc::new(site),
        }
    }
}

/// Editor resolved from the session token
#[derive(Debug, Clone)]
pub struct AuthenticatedEditor(pub Principal);

// ============================================================================
// Page errors
// ============================================================================

/// Failure of an HTML page or a feed.
///
/// The response carries the status and message as an extension;
/// [`render_error_pages`] renders the themed body.
#[derive(Debug)]
pub enum PageError {
    Content(ContentError),
    Render(ThemeError),
}

/// Status and message of a failed page, picked up by [`render_error_pages`]
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub status: StatusCode,
    pub message: String,
}

impl From<ContentError> for PageError {
    fn from(err: ContentError) -> Self {
        PageError::Content(err)
    }
}

impl From<ThemeError> for PageError {
    fn from(err: ThemeError) -> Self {
        PageError::Render(err)
    }
}

impl PageError {
    fn failure(&self) -> PageFailure {
        match self {
            PageError::Content(err) if err.is_not_found() => PageFailure {
                status: StatusCode::NOT_FOUND,
                message: "The page you are looking for does not exist.".to_string(),
            },
            PageError::Content(err) => {
                tracing::error!("Request failed: {}", err);
                internal_failure()
            }
            PageError::Render(err) => {
                tracing::error!("Rendering failed: {}", err);
                internal_failure()
            }
        }
    }
}

fn internal_failure() -> PageFailure {
    PageFailure {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Something went wrong on our side.".to_string(),
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let failure = self.failure();
        let mut response = (failure.status, failure.message.clone()).into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

/// Replace the body of failed page responses with the themed error page
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let Some(failure) = response.extensions().get::<PageFailure>().cloned() else {
        return response;
    };

    let html = state
        .renderer
        .render_error_page(failure.status.as_u16(), &failure.message);
    (failure.status, Html(html)).into_response()
}

// ============================================================================
// API errors
// ============================================================================

/// Error response for the JSON surface
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        if err.is_not_found() {
            ApiError::not_found(err.to_string())
        } else {
            tracing::error!("Admin request failed: {}", err);
            ApiError::internal_error("Failed to read content")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut response = (status, Json(self)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Extract session token from the Authorization header or the `session` cookie
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let principal = state
        .authenticator
        .authenticate(&token)
        .await
        .map_err(|e| {
            tracing::error!("Session validation failed: {}", e);
            ApiError::internal_error("Session validation failed")
        })?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    tracing::debug!("Authenticated editor {}", principal.author_id);
    request.extensions_mut().insert(AuthenticatedEditor(principal));
    Ok(next.run(request).await)
}
