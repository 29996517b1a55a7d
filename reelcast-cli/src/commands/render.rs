//! Render command handlers
//!
//! Starts render jobs and follows them to completion, printing every
//! progress update. Ctrl-C cancels the job being followed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use reelcast_client::BackendClient;
use reelcast_client::poller::{
    JobPoller, PollError, PollObserver, PollSession, ProgressUpdate,
};
use reelcast_client::slot::SessionSlot;
use reelcast_core::domain::job::JobHandle;
use reelcast_core::domain::render::{BackendContract, RenderKind};
use tracing::debug;

use super::{colorize_status, describe_client_error, save};
use crate::config::Config;

/// Render a video using the configured backend contract
pub async fn handle_render(
    kind: RenderKind,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let client = Arc::new(BackendClient::new(&config.backend_url));

    match config.contract {
        BackendContract::Polling => render_polling(client, kind, output, config).await,
        BackendContract::Direct => render_direct(&client, kind, output).await,
    }
}

/// Follow an already started render job
pub async fn handle_watch(job_id: &str, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let job = JobHandle::new(job_id).context("job id must not be empty")?;
    let client = Arc::new(BackendClient::new(&config.backend_url));
    let poller = JobPoller::new(client.clone());
    let slot = SessionSlot::new();
    let interrupt = spawn_interrupt_handler(slot.clone());

    let session = poller.poll(job, config.poll_options(), ProgressPrinter)?;
    slot.replace(session.handle());

    let result = follow(session, &slot, &client, output).await;
    interrupt.abort();
    result
}

/// Submit a job and poll it until it reaches a terminal state
async fn render_polling(
    client: Arc<BackendClient>,
    kind: RenderKind,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let poller = JobPoller::new(client.clone());
    let slot = SessionSlot::new();
    let interrupt = spawn_interrupt_handler(slot.clone());

    println!("{}", format!("Starting {} render job...", kind).bold());
    let session = slot
        .start(&poller, kind, config.poll_options(), ProgressPrinter)
        .await
        .map_err(describe_poll_error)?;

    let result = follow(session, &slot, &client, output).await;
    interrupt.abort();
    result
}

/// Render through the synchronous contract: the response body is the video
async fn render_direct(
    client: &BackendClient,
    kind: RenderKind,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("{}", format!("Rendering {} video...", kind).bold());
    let video = client
        .render_direct(kind)
        .await
        .map_err(describe_client_error)
        .context("Render request failed")?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}_video.mp4", kind)));
    save(&path, &video).await
}

/// Wait for a session to end and report the outcome
async fn follow(
    session: PollSession,
    slot: &SessionSlot,
    client: &BackendClient,
    output: Option<PathBuf>,
) -> Result<()> {
    let session_id = session.id();
    let job = session.job().clone();
    println!("  Job {} (checking status...)", job.to_string().cyan());

    let result = session.wait().await;
    slot.clear(session_id);

    match result {
        None => {
            println!("{}", format!("Stopped following job {}.", job).yellow());
            Ok(())
        }
        Some(Ok(outcome)) => {
            println!(
                "{} Job {} done after {} status check(s)",
                "✓".green(),
                job.to_string().cyan(),
                outcome.attempts
            );

            let Some(locator) = outcome.result_url else {
                println!("{}", "  The backend returned no download link.".dimmed());
                return Ok(());
            };
            println!("  Download: {}", client.absolute_url(&locator).cyan());

            if let Some(path) = output {
                let video = client
                    .download(&locator)
                    .await
                    .context("Failed to download video")?;
                save(&path, &video).await?;
            }
            Ok(())
        }
        Some(Err(e)) => Err(describe_poll_error(e)),
    }
}

/// Maps a poll failure to a CLI error naming the kind of failure
fn describe_poll_error(error: PollError) -> anyhow::Error {
    let summary = match &error {
        PollError::Submission(_) => "Could not start the render job",
        PollError::Query(_) => "Status check failed",
        PollError::TimedOut { .. } => "Render is taking too long",
        PollError::JobFailed(_) => "Render failed",
        PollError::InvalidOptions(_) => "Invalid polling configuration",
    };

    match error {
        PollError::Submission(inner) => describe_client_error(inner).context(summary),
        other => anyhow::Error::new(other).context(summary),
    }
}

/// Cancel the followed session on Ctrl-C; exit if nothing is being followed
fn spawn_interrupt_handler(slot: SessionSlot) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            debug!("Interrupt received");
            if !slot.cancel_current() {
                std::process::exit(130);
            }
        }
    })
}

/// Prints each progress update as it arrives
struct ProgressPrinter;

impl PollObserver for ProgressPrinter {
    fn on_update(&mut self, update: &ProgressUpdate) {
        let observed_at = update
            .observed_at
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string();

        println!(
            "  {} {} {} (check {})",
            "▸".cyan(),
            observed_at.dimmed(),
            colorize_status(&update.status),
            update.attempt
        );
    }
}
