//! Folio - a server-rendered publishing platform

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::{
    api::{self, AppState},
    config::Config,
    db::{self, DatabasePool},
    theme::Renderer,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folio...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    pool.ping().await?;
    tracing::info!("Database connected: {:?}", pool.driver());

    // Run migrations
    let applied = db::migrations::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    // Templates are compiled once; a broken template stops startup here
    let renderer = Renderer::new().context("Failed to compile templates")?;

    let state = AppState::new(
        pool.clone(),
        config.database.query_timeout(),
        config.site.clone(),
        renderer,
    );

    // Build router
    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    pool.close().await;
    Ok(())
}
