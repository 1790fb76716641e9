//! Rendering error types

use thiserror::Error;

/// Theme-specific errors
#[derive(Debug, Error)]
pub enum ThemeError {
    /// An embedded template could not be loaded or parsed
    #[error("Failed to load template {name}: {reason}")]
    LoadError { name: String, reason: String },

    /// Template rendering error
    #[error("Template error: {0}")]
    TemplateError(String),
}
