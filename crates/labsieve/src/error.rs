//! Error types for the labsieve library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for labsieve operations.
#[derive(Debug, Error)]
pub enum SieveError {
    /// Error reading, writing or creating a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage input does not exist yet.
    ///
    /// The hint names the command that produces the missing input.
    #[error("Missing input '{path}': {hint}")]
    MissingInput { path: PathBuf, hint: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Directory traversal error.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Detached signing failed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl SieveError {
    /// Wrap an IO error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SieveError::Io {
            path: path.into(),
            source,
        }
    }

    /// A missing input that should be produced by an earlier stage.
    pub(crate) fn missing(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        SieveError::MissingInput {
            path: path.into(),
            hint: hint.into(),
        }
    }
}

/// Result type alias for labsieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
