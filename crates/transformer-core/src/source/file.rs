//! Image inventory read from a local JSON file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{retain_identified, ImageSource};
use crate::error::{SourceError, SourceResult};
use crate::types::Image;

/// Reads the same JSON array the inventory API returns, from disk.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_images(&self) -> SourceResult<Vec<Image>> {
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let images: Vec<Image> =
            serde_json::from_slice(&content).map_err(|e| SourceError::Decode {
                origin: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!("Read {} image record(s) from {:?}", images.len(), self.path);
        Ok(retain_identified(images, &self.path.display().to_string()))
    }
}
