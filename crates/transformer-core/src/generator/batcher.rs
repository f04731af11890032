//! Cyclic batching of requests across the discovered image set.

use rand::Rng;

use super::builder::RequestBuilder;
use super::composer::TransformationComposer;
use crate::config::GenerateConfig;
use crate::error::BatchError;
use crate::types::{Image, TransformationRequest};

/// Immutable settings for one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    /// Exact number of requests to produce
    pub count: usize,

    /// Exclusive upper bound for resize factors
    pub max_resize_factor: f64,
}

impl From<&GenerateConfig> for BatchConfig {
    fn from(config: &GenerateConfig) -> Self {
        Self {
            count: config.count,
            max_resize_factor: config.max_resize_factor,
        }
    }
}

/// Produces exactly `count` requests, visiting images round-robin in order.
///
/// With fewer images than requests the list wraps around; every visit
/// re-rolls the transformations independently.
#[derive(Debug)]
pub struct RequestBatcher<'a> {
    images: &'a [Image],
    count: usize,
    composer: TransformationComposer,
}

impl<'a> RequestBatcher<'a> {
    /// Create a batcher over `images`.
    ///
    /// Fails when requests are wanted but there is no image to build them from.
    pub fn new(images: &'a [Image], config: BatchConfig) -> Result<Self, BatchError> {
        if images.is_empty() && config.count > 0 {
            return Err(BatchError::NoImages {
                requested: config.count,
            });
        }
        Ok(Self {
            images,
            count: config.count,
            composer: TransformationComposer::new(config.max_resize_factor),
        })
    }

    /// Number of requests this batcher produces.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Lazily yield the batch, drawing randomness from `rng`.
    pub fn iter<'r, R: Rng + ?Sized>(&self, rng: &'r mut R) -> Requests<'a, 'r, R> {
        Requests {
            images: self.images,
            composer: self.composer,
            position: 0,
            remaining: self.count,
            rng,
        }
    }

    /// Collect the whole batch.
    pub fn batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<TransformationRequest> {
        self.iter(rng).collect()
    }
}

/// Iterator over the requests of one batch.
pub struct Requests<'a, 'r, R: ?Sized> {
    images: &'a [Image],
    composer: TransformationComposer,
    position: usize,
    remaining: usize,
    rng: &'r mut R,
}

impl<R: Rng + ?Sized> Iterator for Requests<'_, '_, R> {
    type Item = TransformationRequest;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let image = &self.images[self.position % self.images.len()];
        self.position += 1;
        self.remaining -= 1;

        let transformations = self.composer.compose(&mut *self.rng);
        Some(RequestBuilder::build(image, transformations, &mut *self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R: Rng + ?Sized> ExactSizeIterator for Requests<'_, '_, R> {}
