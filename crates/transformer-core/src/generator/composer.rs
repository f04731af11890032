//! Random composition of per-image transformation lists.
//!
//! Every kind gets an independent fair coin, in the fixed order grayscale,
//! flip, rotate, resize. A list can therefore come out empty (1 in 16),
//! which the image service accepts as a no-op transform.

use rand::Rng;

use crate::types::{Transformation, TransformationKind};

/// Inclusive bound on rotation degrees, in either direction.
pub const MAX_ROTATION_DEGREES: i32 = 360;

/// Decides which transformations to apply to one image, and with what parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformationComposer {
    /// Resize factors are drawn from `[0, max_resize_factor)`
    max_resize_factor: f64,
}

impl TransformationComposer {
    /// Create a composer with the given exclusive resize bound.
    pub fn new(max_resize_factor: f64) -> Self {
        Self { max_resize_factor }
    }

    /// Compose 0 to 4 transformations, each kind at most once.
    pub fn compose<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Transformation> {
        let mut transformations = Vec::with_capacity(TransformationKind::ALL.len());
        for kind in TransformationKind::ALL {
            if rng.gen_bool(0.5) {
                transformations.push(self.roll(kind, rng));
            }
        }
        transformations
    }

    /// Draw the parameters for a single kind.
    fn roll<R: Rng + ?Sized>(&self, kind: TransformationKind, rng: &mut R) -> Transformation {
        match kind {
            TransformationKind::Grayscale => Transformation::grayscale(),
            TransformationKind::Flip => Transformation::flip(rng.gen_bool(0.5), rng.gen_bool(0.5)),
            TransformationKind::Rotate => Transformation::rotate(
                rng.gen_range(-MAX_ROTATION_DEGREES..=MAX_ROTATION_DEGREES),
            ),
            TransformationKind::Resize => Transformation::resize(self.resize_factor(rng)),
        }
    }

    /// Uniform factor in `[0, max)`, kept to thousandths before formatting.
    fn resize_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let thousandths = (self.max_resize_factor * 1000.0) as u64;
        if thousandths == 0 {
            return 0.0;
        }
        rng.gen_range(0..thousandths) as f64 / 1000.0
    }
}

impl Default for TransformationComposer {
    fn default() -> Self {
        Self::new(3.0)
    }
}
