//! Transformer Core - load-test target generation for the image service.
//!
//! Looks up candidate images, randomly composes a transformation request for
//! each one, and encodes the requests as vegeta JSON targets, one per line.
//!
//! # Architecture
//!
//! ```text
//! ImageSource → RequestBatcher → TransformationComposer → RequestBuilder → TargetEncoder → stdout
//! ```
//!
//! Randomness is injected as any [`rand::Rng`], so a seeded generator gives a
//! reproducible target file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rand::SeedableRng;
//! use transformer_core::{Config, Generator, HttpImageSource, TargetEncoder};
//!
//! #[tokio::main]
//! async fn main() -> transformer_core::Result<()> {
//!     let config = Config::load()?;
//!     let generator = Generator::new(
//!         Box::new(HttpImageSource::new(&config.source)),
//!         config.generate.clone(),
//!     );
//!     let mut encoder = TargetEncoder::new(std::io::stdout(), &config.generate.transform_url);
//!     let mut rng = rand::rngs::StdRng::from_entropy();
//!     let summary = generator.run_round(&mut encoder, &mut rng).await?;
//!     eprintln!("{} targets written", summary.written);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod generator;
pub mod source;
pub mod target;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, ErrorPolicy};
pub use error::{
    BatchError, ConfigError, EncodeError, Result, SourceError, SourceResult, TransformerError,
};
pub use generator::{
    BatchConfig, GenerationSummary, Generator, RequestBatcher, RequestBuilder,
    TransformationComposer,
};
pub use source::{FileImageSource, HttpImageSource, ImageSource, StaticImageSource};
pub use target::{decode_line, Target, TargetEncoder};
pub use types::{Image, Transformation, TransformationKind, TransformationRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
