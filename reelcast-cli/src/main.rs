//! Reelcast CLI
//!
//! Command-line front end for a Reelcast render backend: fetch scripts,
//! render videos and follow render jobs until they finish.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use reelcast_core::domain::render::BackendContract;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "reelcast_cli=info,reelcast_client=info";

#[derive(Parser)]
#[command(name = "reelcast")]
#[command(about = "Request scripts and rendered videos from a Reelcast backend", long_about = None)]
struct Cli {
    /// Backend URL (leave empty when no backend is available)
    #[arg(long, env = "REELCAST_BACKEND_URL", default_value = "")]
    backend_url: String,

    /// Render flow of the backend: polling or direct
    #[arg(long, env = "REELCAST_CONTRACT", default_value = "polling")]
    contract: BackendContract,

    /// Milliseconds between two status checks
    #[arg(long, env = "REELCAST_POLL_INTERVAL_MS", default_value_t = 3000)]
    interval_ms: u64,

    /// Maximum number of status checks (defaults to 60 when no duration bound is set)
    #[arg(long, env = "REELCAST_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Maximum number of seconds to follow a job
    #[arg(long, env = "REELCAST_MAX_DURATION_SECS")]
    max_duration_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        backend_url: cli.backend_url,
        contract: cli.contract,
        poll_interval: Duration::from_millis(cli.interval_ms),
        max_attempts: cli.max_attempts,
        max_duration: cli.max_duration_secs.map(Duration::from_secs),
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tracing::Level;
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn test_default_filter_shows_client_info() {
        let filter = tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::from_level(Level::INFO)));
        assert!(DEFAULT_LOG_FILTER.contains("reelcast_client=info"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
