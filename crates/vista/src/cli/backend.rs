//! The `vista backend` command.

use std::time::Duration;

use clap::{Args, Subcommand};
use vista_core::{Config, HttpBackend, RemoteBackend};

/// Arguments for the `backend` command.
#[derive(Args, Debug)]
pub struct BackendArgs {
    #[command(subcommand)]
    pub command: BackendCommand,
}

#[derive(Subcommand, Debug)]
pub enum BackendCommand {
    /// Check that the backend answers its health route
    Status {
        /// Backend base URL (defaults to `[backend] endpoint`)
        #[arg(long, env = "VISTA_BACKEND_URL")]
        backend_url: Option<String>,
    },
}

/// Execute the backend command.
pub async fn execute(args: BackendArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        BackendCommand::Status { backend_url } => {
            let endpoint = backend_url.unwrap_or_else(|| config.backend.endpoint.clone());
            let backend =
                HttpBackend::new(&endpoint, Duration::from_millis(config.backend.timeout_ms));

            if backend.is_available().await {
                println!("Backend at {} is reachable", backend.endpoint());
            } else {
                anyhow::bail!(
                    "Backend at {} is not reachable\n\n  Hint: start it, or pass --no-backend to `vista analyze`.",
                    backend.endpoint()
                );
            }
        }
    }

    Ok(())
}
