//! Script command handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;
use reelcast_client::BackendClient;
use reelcast_core::domain::render::RenderKind;

use super::{describe_client_error, save};
use crate::config::Config;

/// Generate a script, print it and optionally save it
pub async fn handle_script(
    kind: RenderKind,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let client = BackendClient::new(&config.backend_url);

    println!("{}", format!("Requesting {} script...", kind).bold());
    let response = client
        .generate_script(kind)
        .await
        .map_err(describe_client_error)
        .context("Failed to generate script")?;

    println!("{}", "─".repeat(80).dimmed());
    println!("{}", response.script);
    println!("{}", "─".repeat(80).dimmed());

    let locator = response.download_url.filter(|url| !url.trim().is_empty());

    if let Some(locator) = &locator {
        println!("  Download: {}", client.absolute_url(locator).cyan());
    }

    if let Some(path) = output {
        // Prefer the backend's file; fall back to the text we already have
        let bytes = match &locator {
            Some(locator) => client
                .download(locator)
                .await
                .context("Failed to download script")?,
            None => response.script.into_bytes(),
        };
        save(&path, &bytes).await?;
    }

    Ok(())
}
