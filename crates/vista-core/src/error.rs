//! Error types for the Vista fusion engine.
//!
//! Configuration and input errors surface to the caller. Source errors never
//! escape a fusion call: they are logged at the adapter boundary and recorded
//! in the per-source status, and the failing source contributes nothing.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Source;

/// Top-level error type for Vista operations.
#[derive(Error, Debug)]
pub enum VistaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image input errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while turning a file into an image handle.
#[derive(Error, Debug)]
pub enum InputError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Extension is not in the supported list
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Content does not look like an image
    #[error("Invalid image {path}: {message}")]
    InvalidImage { path: PathBuf, message: String },

    /// Reading the file failed
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Failure of a single prediction source.
///
/// Every variant is treated as "source unavailable": the source contributes
/// zero predictions to the fusion pool.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network error, local inference error, missing predictor output
    #[error("{predictor} unavailable: {message}")]
    Unavailable { predictor: Source, message: String },

    /// Backend answered with a non-success HTTP status
    #[error("{predictor} HTTP {status_code}: {message}")]
    Http {
        predictor: Source,
        status_code: u16,
        message: String,
    },

    /// Reachable, but the response violates the expected schema
    #[error("{predictor} returned a malformed response: {message}")]
    Malformed { predictor: Source, message: String },

    /// The source did not answer within its deadline
    #[error("{predictor} timed out after {timeout_ms}ms")]
    Timeout { predictor: Source, timeout_ms: u64 },
}

impl SourceError {
    /// Shorthand for the common "unavailable" case.
    pub fn unavailable(predictor: Source, message: impl Into<String>) -> Self {
        Self::Unavailable {
            predictor,
            message: message.into(),
        }
    }

    /// The source this error belongs to.
    pub fn predictor(&self) -> Source {
        match self {
            Self::Unavailable { predictor, .. }
            | Self::Http { predictor, .. }
            | Self::Malformed { predictor, .. }
            | Self::Timeout { predictor, .. } => *predictor,
        }
    }
}

/// Convenience type alias for Vista results.
pub type Result<T> = std::result::Result<T, VistaError>;

/// Convenience type alias for source-level results.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
