//! Retry utilities for transient inventory lookup failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use crate::error::SourceError;
use std::time::Duration;

/// Determine whether a source error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), server errors (5xx),
/// connection failures. Non-retryable: other HTTP statuses, bad payloads,
/// unreadable files.
pub fn is_retryable(error: &SourceError) -> bool {
    match error {
        SourceError::Timeout { .. } => true,
        SourceError::Http { status_code, .. } => match status_code {
            Some(code) => *code == 429 || (500..=599).contains(code),
            // No status: the request never got an answer (DNS, refused, reset)
            None => true,
        },
        SourceError::Decode { .. } | SourceError::Io { .. } => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}
