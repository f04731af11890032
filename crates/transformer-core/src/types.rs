//! Core data types: inventory images, transformations, and requests.
//!
//! Field names and ordering match the JSON contract of the image service, so
//! the serialized `TransformationRequest` is the exact POST body it receives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An image record returned by the inventory API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Service-assigned identifier
    pub id: String,

    /// Uploaded file name
    #[serde(default)]
    pub name: String,

    /// MIME type of the stored image
    #[serde(default)]
    pub content_type: String,
}

impl Image {
    /// Create an image record with just an id (name and content type empty).
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            content_type: String::new(),
        }
    }
}

/// The four transformation kinds understood by the image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationKind {
    Grayscale,
    Flip,
    Rotate,
    Resize,
}

impl TransformationKind {
    /// All kinds, in the order they are considered during composition.
    pub const ALL: [TransformationKind; 4] = [
        TransformationKind::Grayscale,
        TransformationKind::Flip,
        TransformationKind::Rotate,
        TransformationKind::Resize,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::Grayscale => "grayscale",
            TransformationKind::Flip => "flip",
            TransformationKind::Rotate => "rotate",
            TransformationKind::Resize => "resize",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image operation with string-keyed parameters.
///
/// Properties live in a `BTreeMap` so the serialized body is stable for a
/// given random seed. An empty map goes on the wire as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    #[serde(rename = "type")]
    pub kind: TransformationKind,

    #[serde(default, with = "nullable_properties")]
    pub properties: BTreeMap<String, String>,
}

/// Serde adapter: empty map <-> `null`, missing key reads as empty.
mod nullable_properties {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        properties: &BTreeMap<String, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if properties.is_empty() {
            serializer.serialize_none()
        } else {
            properties.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, String>, D::Error> {
        Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

impl Transformation {
    /// Grayscale conversion (no properties).
    pub fn grayscale() -> Self {
        Self {
            kind: TransformationKind::Grayscale,
            properties: BTreeMap::new(),
        }
    }

    /// Mirror along either or both axes.
    pub fn flip(vertical: bool, horizontal: bool) -> Self {
        Self::with_properties(
            TransformationKind::Flip,
            [
                ("vertical", vertical.to_string()),
                ("horizontal", horizontal.to_string()),
            ],
        )
    }

    /// Rotate by a whole number of degrees.
    pub fn rotate(degrees: i32) -> Self {
        Self::with_properties(TransformationKind::Rotate, [("degrees", degrees.to_string())])
    }

    /// Scale by `factor`, rendered with exactly two fractional digits.
    pub fn resize(factor: f64) -> Self {
        Self::with_properties(TransformationKind::Resize, [("factor", format!("{factor:.2}"))])
    }

    fn with_properties<const N: usize>(
        kind: TransformationKind,
        properties: [(&str, String); N],
    ) -> Self {
        Self {
            kind,
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Look up a property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// The POST body asking the service to transform one image.
///
/// Created once per (image, round) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationRequest {
    /// Id of the image to transform
    pub image_id: String,

    /// Whether the service should store the result
    pub persist: bool,

    /// Generated label (`gen_tr_` prefix)
    pub name: String,

    /// Operations in application order
    pub transformations: Vec<Transformation>,
}
