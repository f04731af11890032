//! Request generation: composition, naming, batching, and the round driver.
//!
//! One round looks like:
//!
//! ```text
//! ImageSource → RequestBatcher → TransformationComposer → RequestBuilder → TargetEncoder
//! ```

pub mod batcher;
pub mod builder;
pub mod composer;

pub use batcher::{BatchConfig, RequestBatcher, Requests};
pub use builder::{RequestBuilder, NAME_PREFIX};
pub use composer::TransformationComposer;

use rand::Rng;
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{ErrorPolicy, GenerateConfig};
use crate::error::Result;
use crate::source::ImageSource;
use crate::target::TargetEncoder;
use crate::types::Image;

/// Counters for one generation round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// Images the batch was built from
    pub images: usize,
    /// Requests the batch asked for
    pub requested: usize,
    /// Target lines written
    pub written: usize,
    /// Requests dropped under the skip policy
    pub failed: usize,
    /// The round stopped early on the interrupt flag
    pub interrupted: bool,
}

/// Drives rounds: look up images, build the batch, write targets.
pub struct Generator {
    source: Box<dyn ImageSource>,
    config: GenerateConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Generator {
    pub fn new(source: Box<dyn ImageSource>, config: GenerateConfig) -> Self {
        Self {
            source,
            config,
            interrupt: None,
        }
    }

    /// Stop emitting at the next request once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run one round against a freshly fetched inventory.
    pub async fn run_round<W: Write, R: Rng + ?Sized>(
        &self,
        encoder: &mut TargetEncoder<W>,
        rng: &mut R,
    ) -> Result<GenerationSummary> {
        let images = self.source.fetch_images().await?;
        tracing::info!(
            "Found {} image(s) via {} source",
            images.len(),
            self.source.name()
        );
        tracing::debug!(
            "Emitting {} target(s) for {} (error policy: {})",
            self.config.count,
            encoder.url(),
            self.config.error_policy
        );
        self.emit(&images, encoder, rng)
    }

    /// Build the batch for `images` and write it, honouring the error policy.
    ///
    /// Under [`ErrorPolicy::Stop`] the first failing request ends the round;
    /// targets written before it stay on the sink. A set interrupt flag ends
    /// the round cleanly before the next request.
    pub fn emit<W: Write, R: Rng + ?Sized>(
        &self,
        images: &[Image],
        encoder: &mut TargetEncoder<W>,
        rng: &mut R,
    ) -> Result<GenerationSummary> {
        let batcher = RequestBatcher::new(images, BatchConfig::from(&self.config))?;
        let mut summary = GenerationSummary {
            images: images.len(),
            requested: batcher.count(),
            ..GenerationSummary::default()
        };

        for request in batcher.iter(rng) {
            if self.interrupted() {
                tracing::info!(
                    "Interrupted after {} of {} target(s)",
                    summary.written,
                    summary.requested
                );
                summary.interrupted = true;
                break;
            }
            match encoder.encode(&request) {
                Ok(()) => summary.written += 1,
                Err(e) => match self.config.error_policy {
                    ErrorPolicy::Stop => {
                        tracing::error!(
                            "Abandoning batch after {} of {} target(s): {e}",
                            summary.written,
                            summary.requested
                        );
                        return Err(e.into());
                    }
                    ErrorPolicy::Skip => {
                        tracing::warn!("Skipping request: {e}");
                        summary.failed += 1;
                    }
                },
            }
        }

        tracing::debug!(?summary, "Round complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BatchError, EncodeError, TransformerError};
    use crate::source::StaticImageSource;
    use crate::target::decode_line;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io;

    /// Sink that rejects exactly one line (by index) and accepts the rest.
    struct FlakyWriter {
        lines: Vec<Vec<u8>>,
        current: Vec<u8>,
        reject: usize,
        seen: usize,
    }

    impl FlakyWriter {
        fn rejecting(reject: usize) -> Self {
            Self {
                lines: Vec::new(),
                current: Vec::new(),
                reject,
                seen: 0,
            }
        }
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.seen == self.reject {
                self.seen += 1;
                return Err(io::Error::other("disk full"));
            }
            self.current.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if !self.current.is_empty() {
                self.lines.push(std::mem::take(&mut self.current));
                self.seen += 1;
            }
            Ok(())
        }
    }

    /// Sink that raises the interrupt flag once `after` lines are flushed.
    struct InterruptingWriter {
        buf: Vec<u8>,
        lines: usize,
        after: usize,
        flag: Arc<AtomicBool>,
    }

    impl Write for InterruptingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.lines = self.buf.iter().filter(|b| **b == b'\n').count();
            if self.lines >= self.after {
                self.flag.store(true, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    fn generator(images: &[&str], count: usize, error_policy: ErrorPolicy) -> Generator {
        let images = images.iter().map(|id| Image::with_id(*id)).collect();
        Generator::new(
            Box::new(StaticImageSource::new(images)),
            GenerateConfig {
                count,
                error_policy,
                ..GenerateConfig::default()
            },
        )
    }

    fn encoder<W: Write>(writer: W) -> TargetEncoder<W> {
        TargetEncoder::new(writer, GenerateConfig::default().transform_url)
    }

    #[tokio::test]
    async fn test_round_emits_cycled_targets() {
        let generator = generator(&["a", "b", "c"], 5, ErrorPolicy::Stop);
        let mut encoder = encoder(Vec::new());
        let mut rng = StdRng::seed_from_u64(8);

        let summary = generator.run_round(&mut encoder, &mut rng).await.unwrap();
        assert_eq!(
            summary,
            GenerationSummary {
                images: 3,
                requested: 5,
                written: 5,
                failed: 0,
                interrupted: false,
            }
        );

        let output = String::from_utf8(encoder.into_inner()).unwrap();
        let ids: Vec<String> = output
            .lines()
            .map(|line| decode_line(line).unwrap().1.image_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_round_without_images_emits_nothing() {
        let generator = generator(&[], 3, ErrorPolicy::Stop);
        let mut encoder = encoder(Vec::new());
        let mut rng = StdRng::seed_from_u64(8);

        let err = generator.run_round(&mut encoder, &mut rng).await.unwrap_err();
        assert!(matches!(
            err,
            TransformerError::Batch(BatchError::NoImages { requested: 3 })
        ));
        assert_eq!(encoder.lines_written(), 0);
        assert!(encoder.into_inner().is_empty());
    }

    #[test]
    fn test_stop_policy_abandons_remaining_batch() {
        let generator = generator(&["a", "b"], 4, ErrorPolicy::Stop);
        let mut encoder = encoder(FlakyWriter::rejecting(1));
        let mut rng = StdRng::seed_from_u64(8);
        let images = vec![Image::with_id("a"), Image::with_id("b")];

        let err = generator.emit(&images, &mut encoder, &mut rng).unwrap_err();
        match err {
            TransformerError::Encode(e @ EncodeError::Write { .. }) => {
                assert!(e.request_name().starts_with(NAME_PREFIX));
            }
            other => panic!("Expected write error, got {other:?}"),
        }

        let writer = encoder.into_inner();
        assert_eq!(writer.lines.len(), 1);
        let line = String::from_utf8(writer.lines[0].clone()).unwrap();
        assert_eq!(decode_line(line.trim_end()).unwrap().1.image_id, "a");
    }

    #[test]
    fn test_skip_policy_continues_after_failure() {
        let generator = generator(&["a", "b"], 4, ErrorPolicy::Skip);
        let mut encoder = encoder(FlakyWriter::rejecting(1));
        let mut rng = StdRng::seed_from_u64(8);
        let images = vec![Image::with_id("a"), Image::with_id("b")];

        let summary = generator.emit(&images, &mut encoder, &mut rng).unwrap();
        assert_eq!(summary.written, 3);
        assert_eq!(summary.failed, 1);

        let ids: Vec<String> = encoder
            .into_inner()
            .lines
            .iter()
            .map(|line| {
                let line = String::from_utf8(line.clone()).unwrap();
                decode_line(line.trim_end()).unwrap().1.image_id
            })
            .collect();
        assert_eq!(ids, vec!["a", "a", "b"]);
    }

    #[test]
    fn test_interrupt_stops_batch_mid_round() {
        let flag = Arc::new(AtomicBool::new(false));
        let generator = generator(&["a", "b"], 5, ErrorPolicy::Stop).with_interrupt(flag.clone());
        let mut encoder = encoder(InterruptingWriter {
            buf: Vec::new(),
            lines: 0,
            after: 2,
            flag: flag.clone(),
        });
        let mut rng = StdRng::seed_from_u64(8);
        let images = vec![Image::with_id("a"), Image::with_id("b")];

        let summary = generator.emit(&images, &mut encoder, &mut rng).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.requested, 5);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed, 0);

        let writer = encoder.into_inner();
        assert_eq!(writer.lines, 2);
        let output = String::from_utf8(writer.buf).unwrap();
        let ids: Vec<String> = output
            .lines()
            .map(|line| decode_line(line).unwrap().1.image_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_preset_interrupt_writes_nothing() {
        let flag = Arc::new(AtomicBool::new(true));
        let generator = generator(&["a"], 3, ErrorPolicy::Stop).with_interrupt(flag);
        let mut encoder = encoder(Vec::new());
        let images = vec![Image::with_id("a")];

        let summary = generator
            .emit(&images, &mut encoder, &mut StdRng::seed_from_u64(8))
            .unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.written, 0);
        assert!(encoder.into_inner().is_empty());
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = generator(&["a", "b"], 6, ErrorPolicy::Stop);
        let images = vec![Image::with_id("a"), Image::with_id("b")];

        let mut first = encoder(Vec::new());
        generator
            .emit(&images, &mut first, &mut StdRng::seed_from_u64(21))
            .unwrap();
        let mut second = encoder(Vec::new());
        generator
            .emit(&images, &mut second, &mut StdRng::seed_from_u64(21))
            .unwrap();

        assert_eq!(first.into_inner(), second.into_inner());
    }
}
