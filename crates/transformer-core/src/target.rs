//! Vegeta target encoding.
//!
//! Each transformation request becomes one HTTP target in vegeta's JSON
//! target format, written as a single line:
//!
//! ```text
//! {"method":"POST","url":"…","header":{"Content-Type":["application/json"]},"body":"<base64>"}
//! ```
//!
//! The body is the request JSON, base64-encoded the way Go marshals `[]byte`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::EncodeError;
use crate::types::TransformationRequest;

/// MIME type of every target body.
pub const CONTENT_TYPE: &str = "application/json";

/// HTTP method of every target.
pub const METHOD: &str = "POST";

/// One HTTP request descriptor in vegeta's target schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub header: BTreeMap<String, Vec<String>>,
    #[serde(default, with = "base64_body")]
    pub body: Vec<u8>,
}

impl Target {
    /// Build the POST target for one request.
    pub fn for_request(
        url: &str,
        request: &TransformationRequest,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(request)?;
        let mut header = BTreeMap::new();
        header.insert("Content-Type".to_string(), vec![CONTENT_TYPE.to_string()]);
        Ok(Self {
            method: METHOD.to_string(),
            url: url.to_string(),
            header,
            body,
        })
    }

    /// Decode the body back into the request it carries.
    pub fn request(&self) -> Result<TransformationRequest, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Serde adapter for `[]byte`-style base64 strings.
mod base64_body {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Writes one target line per request to an output sink.
pub struct TargetEncoder<W: Write> {
    writer: W,
    url: String,
    lines_written: usize,
}

impl<W: Write> TargetEncoder<W> {
    /// Create an encoder posting every target to `url`.
    pub fn new(writer: W, url: impl Into<String>) -> Self {
        Self {
            writer,
            url: url.into(),
            lines_written: 0,
        }
    }

    /// Encode one request, write it as a line, and flush.
    ///
    /// The line is assembled in memory first so a failed marshal never leaves
    /// a partial line on the sink.
    pub fn encode(&mut self, request: &TransformationRequest) -> Result<(), EncodeError> {
        let serialize_err = |source| EncodeError::Serialize {
            name: request.name.clone(),
            source,
        };
        let target = Target::for_request(&self.url, request).map_err(serialize_err)?;
        let mut line = serde_json::to_vec(&target).map_err(serialize_err)?;
        line.push(b'\n');

        self.writer
            .write_all(&line)
            .and_then(|()| self.writer.flush())
            .map_err(|source| EncodeError::Write {
                name: request.name.clone(),
                source,
            })?;

        self.lines_written += 1;
        tracing::trace!(name = %request.name, image_id = %request.image_id, "Target written");
        Ok(())
    }

    /// Endpoint every target posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the number of lines written.
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Consume the encoder and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Parse one target line and the request carried in its body.
pub fn decode_line(line: &str) -> Result<(Target, TransformationRequest), serde_json::Error> {
    let target: Target = serde_json::from_str(line)?;
    let request = target.request()?;
    Ok((target, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transformation;
    use std::io;

    const URL: &str = "http://localhost:8080/api/images/transform";

    fn request(name: &str, transformations: Vec<Transformation>) -> TransformationRequest {
        TransformationRequest {
            image_id: "a".to_string(),
            persist: true,
            name: name.to_string(),
            transformations,
        }
    }

    /// Sink that accepts a fixed number of writes, then fails.
    struct FailingWriter {
        accepted: usize,
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted >= self.budget {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
            }
            self.accepted += 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_matches_vegeta_schema() {
        let mut encoder = TargetEncoder::new(Vec::new(), URL);
        let req = request("gen_tr_x", vec![Transformation::grayscale()]);
        encoder.encode(&req).unwrap();

        let output = String::from_utf8(encoder.into_inner()).unwrap();
        let body = serde_json::to_vec(&req).unwrap();
        let expected = format!(
            "{{\"method\":\"POST\",\"url\":\"{URL}\",\"header\":{{\"Content-Type\":[\"application/json\"]}},\"body\":\"{}\"}}\n",
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &body)
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_content_type_has_no_trailing_whitespace() {
        let target = Target::for_request(URL, &request("n", Vec::new())).unwrap();
        assert_eq!(target.header["Content-Type"], vec!["application/json".to_string()]);
    }

    #[test]
    fn test_each_line_is_standalone_json() {
        let mut encoder = TargetEncoder::new(Vec::new(), URL);
        for i in 0..3 {
            encoder
                .encode(&request(&format!("gen_tr_{i}"), vec![Transformation::rotate(i)]))
                .unwrap();
        }
        assert_eq!(encoder.lines_written(), 3);

        let output = String::from_utf8(encoder.into_inner()).unwrap();
        assert!(output.ends_with('\n'));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(!line.is_empty());
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[test]
    fn test_decode_line_round_trips_request() {
        let req = request(
            "gen_tr_rt",
            vec![
                Transformation::flip(true, false),
                Transformation::resize(0.42),
            ],
        );
        let mut encoder = TargetEncoder::new(Vec::new(), URL);
        encoder.encode(&req).unwrap();
        let output = String::from_utf8(encoder.into_inner()).unwrap();

        let (target, decoded) = decode_line(output.trim_end()).unwrap();
        assert_eq!(target.method, "POST");
        assert_eq!(target.url, URL);
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_empty_transformation_list_is_encoded() {
        let mut encoder = TargetEncoder::new(Vec::new(), URL);
        encoder.encode(&request("gen_tr_empty", Vec::new())).unwrap();
        let output = String::from_utf8(encoder.into_inner()).unwrap();
        let (_, decoded) = decode_line(output.trim_end()).unwrap();
        assert!(decoded.transformations.is_empty());
    }

    #[test]
    fn test_write_failure_names_request() {
        let writer = FailingWriter {
            accepted: 0,
            budget: 0,
        };
        let mut encoder = TargetEncoder::new(writer, URL);
        let err = encoder.encode(&request("gen_tr_broken", Vec::new())).unwrap_err();
        assert!(matches!(err, EncodeError::Write { .. }));
        assert_eq!(err.request_name(), "gen_tr_broken");
        assert_eq!(encoder.lines_written(), 0);
    }

    #[test]
    fn test_decode_line_accepts_null_properties_body() {
        let body = r#"{"imageId":"a","persist":true,"name":"gen_tr_go","transformations":[{"type":"grayscale","properties":null}]}"#;
        let line = format!(
            "{{\"method\":\"POST\",\"url\":\"{URL}\",\"header\":{{\"Content-Type\":[\"application/json\"]}},\"body\":\"{}\"}}",
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, body)
        );

        let (target, decoded) = decode_line(&line).unwrap();
        assert_eq!(target.body, body.as_bytes());
        assert_eq!(decoded, request("gen_tr_go", vec![Transformation::grayscale()]));

        let reencoded = Target::for_request(URL, &decoded).unwrap();
        assert_eq!(reencoded.body, body.as_bytes());
    }

    #[test]
    fn test_invalid_base64_body_is_rejected() {
        let line = r#"{"method":"POST","url":"u","header":{},"body":"***"}"#;
        assert!(decode_line(line).is_err());
    }
}
