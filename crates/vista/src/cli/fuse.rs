//! The `vista fuse` command: offline fusion of captured raw outputs.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use vista_core::output::to_json;
use vista_core::{Config, FusionEngine, FusionResult, SourceOutputs};

/// Arguments for the `fuse` command.
#[derive(Args, Debug)]
pub struct FuseArgs {
    /// JSON document with `detections`, `backend` and `classifications` (`-` for stdin)
    pub raw: PathBuf,

    /// Pretty-print the result
    #[arg(long)]
    pub pretty: bool,

    /// Print a human-readable table with confidence bands instead of JSON
    #[arg(long, conflicts_with = "pretty")]
    pub table: bool,
}

/// Parse a raw-outputs document and fuse it.
fn fuse_document(content: &str, config: &Config) -> anyhow::Result<FusionResult> {
    let outputs: SourceOutputs = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Invalid raw outputs document: {e}"))?;
    Ok(FusionEngine::new(config).fuse_outputs(&outputs))
}

/// One line per label: rank, label, confidence, band, source.
fn format_table(result: &FusionResult) -> String {
    if result.is_empty() {
        return "No labels\n".to_string();
    }
    result
        .predictions()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}. {:<24} {:>5.1}%  {:<8}  {}\n",
                i + 1,
                p.label,
                p.confidence * 100.0,
                p.band().as_str(),
                p.source
            )
        })
        .collect()
}

/// Execute the fuse command.
pub async fn execute(args: FuseArgs, config: &Config) -> anyhow::Result<()> {
    let content = if args.raw.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        tokio::fs::read_to_string(&args.raw).await?
    };

    let result = fuse_document(&content, config)?;
    tracing::debug!("Fused {:?}: {:?}", args.raw, result.labels());
    if args.table {
        print!("{}", format_table(&result));
    } else {
        println!("{}", to_json(&result, args.pretty || config.output.pretty)?);
    }
    Ok(())
}
