//! Status command handler

use anyhow::{Context, Result};
use colored::*;
use reelcast_client::BackendClient;
use reelcast_core::domain::job::{JobHandle, JobStatus};

use super::{colorize_status, describe_client_error};
use crate::config::Config;

/// Query a render job once and print its status
pub async fn handle_status(job_id: &str, config: &Config) -> Result<()> {
    let job = JobHandle::new(job_id).context("job id must not be empty")?;
    let client = BackendClient::new(&config.backend_url);

    let status = client
        .render_status(&job)
        .await
        .map_err(describe_client_error)
        .with_context(|| format!("Failed to query status of job {}", job))?;

    print_status_details(&client, &job, &status);

    Ok(())
}

/// Print detailed status information
fn print_status_details(client: &BackendClient, job: &JobHandle, status: &JobStatus) {
    println!("{}", "Render Job:".bold());
    println!("  ID:       {}", job.to_string().cyan());
    println!("  Status:   {}", colorize_status(status));

    if let JobStatus::Done {
        result_url: Some(locator),
    } = status
    {
        println!("  Download: {}", client.absolute_url(locator).cyan());
    }
}
