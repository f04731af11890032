//! Error types for the transformation target generator.
//!
//! Errors are organized by stage (config, inventory lookup, batching, encoding)
//! so failures name the component and, where one exists, the request involved.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for transformer operations.
#[derive(Error, Debug)]
pub enum TransformerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image inventory lookup errors
    #[error("Image source error: {0}")]
    Source(#[from] SourceError),

    /// Batch precondition errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Target encoding errors
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
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

/// Errors raised while looking up the image inventory.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error from {url}: {message}")]
    Http {
        url: String,
        message: String,
        /// HTTP status code when the server answered
        status_code: Option<u16>,
    },

    /// Request did not complete in time
    #[error("Timed out fetching {url} after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Response body was not a JSON array of images
    #[error("Unable to decode image inventory from {origin}: {message}")]
    Decode { origin: String, message: String },

    /// Inventory file could not be read
    #[error("Unable to read image inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Precondition failures when assembling a batch.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    /// No images were discovered, so no request can ever be produced
    #[error("No images available to build {requested} transformation request(s)")]
    NoImages { requested: usize },
}

/// Failures turning one request into a target line.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The request (or its target) could not be marshaled to JSON
    #[error("Unable to marshal transformation request {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The output sink rejected the line
    #[error("Unable to write target for transformation request {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl EncodeError {
    /// Name of the request that failed to encode.
    pub fn request_name(&self) -> &str {
        match self {
            EncodeError::Serialize { name, .. } | EncodeError::Write { name, .. } => name,
        }
    }
}

/// Convenience type alias for transformer results.
pub type Result<T> = std::result::Result<T, TransformerError>;

/// Convenience type alias for image source results.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
