//! Error types for json-export

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for json-export
#[derive(Debug, Error)]
pub enum ExportError {
    /// The selected taxonomy term does not exist
    #[error("Invalid category selected: no term with id {0}")]
    InvalidSelection(u64),

    /// The selection matched no published posts
    #[error("No posts found matching your criteria.")]
    NoMatchingContent,

    /// Markup could not be converted faithfully
    #[error("Conversion degraded: {0}")]
    ConversionDegraded(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content store error
    #[error("Content store error: {0}")]
    Store(String),

    /// Content directory or file is missing
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ExportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the error stems from the caller's selection rather than the system
    pub fn is_client_error(&self) -> bool {
        match self {
            ExportError::InvalidSelection(_) | ExportError::NoMatchingContent => true,
            ExportError::WithContext { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for ExportError {
    fn from(err: toml::ser::Error) -> Self {
        ExportError::Toml(err.to_string())
    }
}

/// Result type alias for json-export
pub type Result<T> = std::result::Result<T, ExportError>;
