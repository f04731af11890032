//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image inventory lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// API endpoint listing candidate images
    pub fetch_url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Max retry attempts for transient failures
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds (doubles each attempt)
    pub retry_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fetch_url: "http://localhost:8081/api/images/nameContaining/gen_up_".to_string(),
            timeout_ms: 10_000,
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

/// What to do when one request fails to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Abandon the rest of the batch
    #[default]
    Stop,
    /// Log the failure and continue with the next request
    Skip,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Stop => write!(f, "stop"),
            ErrorPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Request generation and target settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Endpoint every target POSTs to
    pub transform_url: String,

    /// Number of requests per round
    pub count: usize,

    /// Exclusive upper bound for resize factors
    pub max_resize_factor: f64,

    /// Behaviour on a per-request encode failure
    pub error_policy: ErrorPolicy,

    /// Target file (stdout when unset; supports ~)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            transform_url: "http://localhost:8080/api/images/transform".to_string(),
            count: 100,
            max_resize_factor: 3.0,
            error_policy: ErrorPolicy::Stop,
            output: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
