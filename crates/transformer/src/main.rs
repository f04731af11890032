//! Transformer CLI - image transformation targets for vegeta.
//!
//! Looks up images whose names start with `gen_up_` through the image
//! service's REST API and writes randomly composed transform requests for
//! them as vegeta JSON targets, one per line.
//!
//! # Usage
//!
//! ```bash
//! # 100 targets against the default local services, straight into vegeta
//! transformer generate | vegeta attack -format=json -rate=10 -duration=30s
//!
//! # Reproducible target file
//! transformer generate -n 500 --seed 42 --output targets.jsonl
//!
//! # View configuration
//! transformer config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Transformer - generate image transformation requests for load testing.
#[derive(Parser, Debug)]
#[command(name = "transformer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate transformation targets for vegeta on stdout
    Generate(cli::generate::GenerateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match transformer_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `transformer config path`."
            );
            transformer_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Transformer v{}", transformer_core::VERSION);

    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
