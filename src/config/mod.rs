//! Configuration management
//!
//! Configuration is loaded from:
//! - a `config.yml` file
//! - environment variables (override file settings)
//!
//! Missing optional values are filled with defaults. The `site` section carries
//! the values feeds and canonical URLs are built from, so nothing downstream reads
//! the environment on its own.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::ChannelMeta;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Public site identity
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Upper bound for a single store round-trip, in seconds
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.max(1))
    }
}

fn default_database_url() -> String {
    "data/folio.db".to_string()
}

fn default_query_timeout_secs() -> u64 {
    5
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Public identity of the site, used for feeds, sitemaps and canonical links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL including scheme, without trailing slash
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Site title
    #[serde(default = "default_site_title")]
    pub title: String,
    /// Subtitle of the main feed
    #[serde(default = "default_site_subtitle")]
    pub subtitle: String,
    /// URI advertised as the feed generator
    #[serde(default = "default_generator_uri")]
    pub generator_uri: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            title: default_site_title(),
            subtitle: default_site_subtitle(),
            generator_uri: default_generator_uri(),
        }
    }
}

fn default_domain() -> String {
    "http://localhost:8080".to_string()
}

fn default_site_title() -> String {
    "Publicaciones".to_string()
}

fn default_site_subtitle() -> String {
    "Latest publications".to_string()
}

fn default_generator_uri() -> String {
    "https://example.org/folio".to_string()
}

impl SiteConfig {
    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.domain.trim_end_matches('/')
    }

    /// Build channel metadata for a feed served at `path`
    pub fn channel(&self, path: &str, title: &str, subtitle: &str) -> ChannelMeta {
        ChannelMeta {
            domain: self.base_url().to_string(),
            path: path.to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            generator_uri: self.generator_uri.clone(),
        }
    }

    /// Absolute URL for a site-relative path
    pub fn canonical(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns the default configuration.
    /// If the file exists but is invalid YAML, returns an error with its location.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - FOLIO_SERVER_HOST
    /// - FOLIO_SERVER_PORT
    /// - FOLIO_DATABASE_DRIVER
    /// - FOLIO_DATABASE_URL
    /// - FOLIO_DATABASE_QUERY_TIMEOUT_SECS
    /// - FOLIO_SITE_DOMAIN
    /// - FOLIO_SITE_TITLE
    /// - FOLIO_SITE_SUBTITLE
    /// - FOLIO_SITE_GENERATOR_URI
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FOLIO_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FOLIO_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(driver) = std::env::var("FOLIO_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("FOLIO_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secs) = std::env::var("FOLIO_DATABASE_QUERY_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.database.query_timeout_secs = secs;
            }
        }

        if let Ok(domain) = std::env::var("FOLIO_SITE_DOMAIN") {
            self.site.domain = domain;
        }
        if let Ok(title) = std::env::var("FOLIO_SITE_TITLE") {
            self.site.title = title;
        }
        if let Ok(subtitle) = std::env::var("FOLIO_SITE_SUBTITLE") {
            self.site.subtitle = subtitle;
        }
        if let Ok(uri) = std::env::var("FOLIO_SITE_GENERATOR_URI") {
            self.site.generator_uri = uri;
        }
    }
}

/// Format YAML parsing error with location
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Tests that touch process environment share this lock.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
