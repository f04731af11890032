//! Image inventory lookup over the image service's REST API.

use async_trait::async_trait;
use std::time::Duration;

use super::retry;
use super::{retain_identified, ImageSource};
use crate::config::SourceConfig;
use crate::error::{SourceError, SourceResult};
use crate::types::Image;

/// Fetches images with a GET against the configured inventory endpoint.
pub struct HttpImageSource {
    url: String,
    timeout_ms: u64,
    retry_attempts: u32,
    retry_delay_ms: u64,
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            url: config.fetch_url.clone(),
            timeout_ms: config.timeout_ms,
            retry_attempts: config.retry_attempts,
            retry_delay_ms: config.retry_delay_ms,
            client: reqwest::Client::new(),
        }
    }

    /// One GET, no retries.
    async fn fetch_once(&self) -> SourceResult<Vec<Image>> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                url: self.url.clone(),
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| self.request_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            origin: self.url.clone(),
            message: e.to_string(),
        })
    }

    fn request_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                url: self.url.clone(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            SourceError::Http {
                url: self.url.clone(),
                message: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            }
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_images(&self) -> SourceResult<Vec<Image>> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = retry::backoff_duration(attempt - 1, self.retry_delay_ms);
                tracing::debug!(
                    "Retry {attempt}/{} for {} after {delay:?}",
                    self.retry_attempts,
                    self.url
                );
                tokio::time::sleep(delay).await;
            }

            match self.fetch_once().await {
                Ok(images) => {
                    tracing::debug!("Fetched {} image record(s) from {}", images.len(), self.url);
                    return Ok(retain_identified(images, &self.url));
                }
                Err(e) if attempt < self.retry_attempts && retry::is_retryable(&e) => {
                    tracing::warn!("Image lookup failed, will retry: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
