//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod render;
mod script;
mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use reelcast_client::ClientError;
use reelcast_core::domain::job::JobStatus;
use reelcast_core::domain::render::RenderKind;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a script
    Script {
        /// short or long
        kind: RenderKind,

        /// Save the script to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a video and follow the job until it finishes
    Render {
        /// short or long
        kind: RenderKind,

        /// Save the rendered video to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the current status of a render job
    Status {
        /// Job ID returned when the render was started
        job_id: String,
    },
    /// Follow an already started render job until it finishes
    Watch {
        /// Job ID returned when the render was started
        job_id: String,

        /// Save the rendered video to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    if !config.has_backend() {
        print_no_backend_notice();
    }

    match command {
        Commands::Script { kind, output } => script::handle_script(kind, output, config).await,
        Commands::Render { kind, output } => render::handle_render(kind, output, config).await,
        Commands::Status { job_id } => status::handle_status(&job_id, config).await,
        Commands::Watch { job_id, output } => render::handle_watch(&job_id, output, config).await,
    }
}

fn print_no_backend_notice() {
    eprintln!(
        "{}",
        "No backend configured: requests will be rejected.".yellow()
    );
    eprintln!(
        "{}",
        "  Set --backend-url or REELCAST_BACKEND_URL (e.g. http://localhost:8000).".dimmed()
    );
}

/// Adds a hint to errors caused by a missing backend
fn describe_client_error(error: ClientError) -> anyhow::Error {
    match error {
        ClientError::NotConfigured => {
            anyhow::Error::new(error).context("cannot reach a backend in demo mode")
        }
        other => anyhow::Error::new(other),
    }
}

/// Writes downloaded bytes to disk
async fn save(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "  {} Saved {} ({} bytes)",
        "✓".green(),
        path.display().to_string().bold(),
        bytes.len()
    );
    Ok(())
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.dimmed(),
        JobStatus::Running { .. } => status_str.yellow(),
        JobStatus::Done { .. } => status_str.green(),
        JobStatus::Failed { .. } => status_str.red(),
    }
}
