//! Image inventory lookup.
//!
//! An [`ImageSource`] returns the candidate images a batch is built from.
//! Network access, timeouts and retries live entirely behind this trait.

mod file;
mod http;
pub mod retry;

pub use file::FileImageSource;
pub use http::HttpImageSource;

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::Image;

/// Trait that all image inventory sources implement.
///
/// Uses `async_trait` so sources can be boxed as `Box<dyn ImageSource>`.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Source name for logging (e.g., "http", "file").
    fn name(&self) -> &str;

    /// Look up the current image inventory.
    async fn fetch_images(&self) -> SourceResult<Vec<Image>>;
}

/// A fixed, in-memory image list.
#[derive(Debug, Clone, Default)]
pub struct StaticImageSource {
    images: Vec<Image>,
}

impl StaticImageSource {
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl ImageSource for StaticImageSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_images(&self) -> SourceResult<Vec<Image>> {
        Ok(self.images.clone())
    }
}

/// Drop records without an id; they cannot be addressed by a transform request.
pub(crate) fn retain_identified(images: Vec<Image>, origin: &str) -> Vec<Image> {
    let total = images.len();
    let kept: Vec<Image> = images
        .into_iter()
        .filter(|image| !image.id.trim().is_empty())
        .collect();
    if kept.len() < total {
        tracing::warn!(
            "Ignoring {} image record(s) without an id from {origin}",
            total - kept.len()
        );
    }
    kept
}
