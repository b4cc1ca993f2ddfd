//! Vista CLI - ranked, multi-source labels for what is in a picture.
//!
//! Vista queries an object detector, a remote vision backend and a local
//! classifier about each image, then fuses their answers into at most four
//! labels with provenance and confidence.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a single image
//! vista analyze photo.jpg
//!
//! # Analyze a directory without the remote backend
//! vista analyze ./photos/ --no-backend --output labels.jsonl --format jsonl
//!
//! # Re-fuse captured raw outputs offline
//! vista fuse raw.json
//!
//! # Check the backend
//! vista backend status
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vista_core::Config;

mod cli;
mod logging;

/// Vista - ranked, multi-source labels for what is in a picture.
#[derive(Parser, Debug)]
#[command(name = "vista")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "VISTA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze images and write ranked labels
    Analyze(cli::analyze::AnalyzeArgs),

    /// Fuse previously captured raw predictor outputs
    Fuse(cli::fuse::FuseArgs),

    /// Inspect the remote backend
    Backend(cli::backend::BackendArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config problems go to stderr directly.
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `vista config path`."
                );
                Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Vista v{}", vista_core::VERSION);

    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Fuse(args) => cli::fuse::execute(args, &config).await,
        Commands::Backend(args) => cli::backend::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config, cli.config).await,
    }
}
