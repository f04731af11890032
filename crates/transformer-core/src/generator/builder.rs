//! Wrapping composed transformations into named requests.

use rand::Rng;

use crate::types::{Image, Transformation, TransformationRequest};

/// Prefix shared by every generated request name.
pub const NAME_PREFIX: &str = "gen_tr_";

/// Word pool for the readable part of request names.
const NAME_WORDS: &[&str] = &[
    "amber", "birch", "cobalt", "dune", "ember", "fjord", "glacier", "harbor", "indigo", "juniper",
    "kestrel", "lagoon", "meadow", "nebula", "orchid", "prairie", "quartz", "ridge", "sierra",
    "tundra", "umber", "violet", "willow", "zephyr",
];

/// Largest value of one numeric group in a name (nine digits).
const NAME_GROUP_BOUND: u32 = 1_000_000_000;

/// Builds transformation requests for single images.
pub struct RequestBuilder;

impl RequestBuilder {
    /// Wrap `transformations` into a persisted request for `image`.
    ///
    /// The image record is not validated; its id is copied verbatim.
    pub fn build<R: Rng + ?Sized>(
        image: &Image,
        transformations: Vec<Transformation>,
        rng: &mut R,
    ) -> TransformationRequest {
        TransformationRequest {
            image_id: image.id.clone(),
            persist: true,
            name: Self::generate_name(rng),
            transformations,
        }
    }

    /// Generate a request name like `gen_tr_meadow-004211978-730015234`.
    ///
    /// Names are unique enough for telling requests apart in service logs;
    /// collisions are possible and not checked.
    pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
        let word = NAME_WORDS[rng.gen_range(0..NAME_WORDS.len())];
        let first = rng.gen_range(0..NAME_GROUP_BOUND);
        let second = rng.gen_range(0..NAME_GROUP_BOUND);
        format!("{NAME_PREFIX}{word}-{first:09}-{second:09}")
    }
}
