//! The `transformer generate` command for writing vegeta targets.

use anyhow::Context;
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use transformer_core::{
    Config, ErrorPolicy, FileImageSource, GenerationSummary, Generator, HttpImageSource,
    ImageSource, TargetEncoder,
};

/// Error policy as accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ErrorPolicyArg {
    /// Abandon the rest of the batch on the first failed target
    Stop,
    /// Log the failed target and keep going
    Skip,
}

impl From<ErrorPolicyArg> for ErrorPolicy {
    fn from(arg: ErrorPolicyArg) -> Self {
        match arg {
            ErrorPolicyArg::Stop => ErrorPolicy::Stop,
            ErrorPolicyArg::Skip => ErrorPolicy::Skip,
        }
    }
}

/// Arguments for the `generate` command.
///
/// Unset options fall back to the config file.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// API endpoint for finding images
    #[arg(short, long, visible_alias = "fetchurl")]
    pub fetch_url: Option<String>,

    /// URL for image transformation
    #[arg(short, long, visible_alias = "transformurl")]
    pub transform_url: Option<String>,

    /// Number of transformations to generate per round
    #[arg(short, long)]
    pub number: Option<usize>,

    /// Read the image inventory from a JSON file instead of the API
    #[arg(long, conflicts_with = "fetch_url")]
    pub images_file: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for reproducible output (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of generation rounds; each re-fetches the inventory
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..), conflicts_with = "forever")]
    pub rounds: Option<u32>,

    /// Keep generating rounds until interrupted (Ctrl-C)
    #[arg(long)]
    pub forever: bool,

    /// Pause between rounds in milliseconds
    #[arg(long, default_value = "0")]
    pub interval_ms: u64,

    /// What to do when a target fails to encode
    #[arg(long, value_enum)]
    pub error_policy: Option<ErrorPolicyArg>,
}

impl GenerateArgs {
    /// Rounds to run, `None` meaning until interrupted.
    fn round_limit(&self) -> Option<u32> {
        if self.forever {
            None
        } else {
            Some(self.rounds.unwrap_or(1))
        }
    }
}

/// Apply CLI overrides on top of the loaded config and validate the result.
fn apply_overrides(mut config: Config, args: &GenerateArgs) -> anyhow::Result<Config> {
    if let Some(ref url) = args.fetch_url {
        config.source.fetch_url = url.clone();
    }
    if let Some(ref url) = args.transform_url {
        config.generate.transform_url = url.clone();
    }
    if let Some(number) = args.number {
        config.generate.count = number;
    }
    if let Some(policy) = args.error_policy {
        config.generate.error_policy = policy.into();
    }
    config.validate()?;
    Ok(config)
}

/// Output path from `--output` as given, else from config.
fn output_path(args: &GenerateArgs, config: &Config) -> Option<PathBuf> {
    args.output.clone().or_else(|| config.output_path())
}

/// Raise `flag` and wake `notify` on the first Ctrl-C.
fn spawn_interrupt_watcher(flag: Arc<AtomicBool>, notify: Arc<Notify>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
            notify.notify_one();
        }
    });
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;

    let source: Box<dyn ImageSource> = match args.images_file {
        Some(ref path) => Box::new(FileImageSource::new(path)),
        None => Box::new(HttpImageSource::new(&config.source)),
    };

    let writer: Box<dyn Write> = match output_path(&args, &config) {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Unable to create output file {path:?}"))?;
            tracing::info!("Writing targets to {:?}", path);
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };
    let mut encoder = TargetEncoder::new(writer, config.generate.transform_url.clone());

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::debug!("Random seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    // Rounds encode synchronously; the watcher needs a free worker thread.
    let interrupt = Arc::new(AtomicBool::new(false));
    let shutdown = Arc::new(Notify::new());
    spawn_interrupt_watcher(interrupt.clone(), shutdown.clone());

    let generator = Generator::new(source, config.generate.clone()).with_interrupt(interrupt);
    let limit = args.round_limit();
    let interval = Duration::from_millis(args.interval_ms);

    let mut totals = GenerationSummary::default();
    let mut round: u32 = 0;

    loop {
        round += 1;
        let summary = tokio::select! {
            biased;
            result = generator.run_round(&mut encoder, &mut rng) => {
                result.with_context(|| format!("Round {round} failed"))?
            }
            _ = shutdown.notified() => {
                tracing::info!("Interrupted, stopping after {} round(s)", round - 1);
                break;
            }
        };

        totals.images = summary.images;
        totals.requested += summary.requested;
        totals.written += summary.written;
        totals.failed += summary.failed;
        tracing::info!(
            "Round {round}: wrote {} of {} target(s) for {} image(s)",
            summary.written,
            summary.requested,
            summary.images
        );

        if summary.interrupted {
            tracing::info!("Interrupted, stopping after {round} round(s)");
            break;
        }
        if limit.is_some_and(|limit| round >= limit) {
            break;
        }
        if !interval.is_zero() {
            tokio::select! {
                _ = shutdown.notified() => {
                    tracing::info!("Interrupted, stopping after {round} round(s)");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    encoder.into_inner().flush()?;

    if totals.failed > 0 {
        tracing::warn!(
            "{} target(s) skipped after encode failures ({} written)",
            totals.failed,
            totals.written
        );
    } else {
        tracing::info!("Done: {} target(s) written", totals.written);
    }

    Ok(())
}
