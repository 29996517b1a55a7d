//! Configuration module
//!
//! Backend selection and polling bounds for the CLI.

use std::time::Duration;

use reelcast_client::poller::{DEFAULT_MAX_ATTEMPTS, PollOptions};
use reelcast_core::domain::render::BackendContract;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the render backend; empty means no backend is available
    pub backend_url: String,

    /// Which render flow the backend implements
    pub contract: BackendContract,

    /// Time between two status checks
    pub poll_interval: Duration,

    /// Maximum number of status checks
    pub max_attempts: Option<u32>,

    /// Maximum polling time for one job
    pub max_duration: Option<Duration>,
}

impl Config {
    /// Whether a backend URL is configured
    pub fn has_backend(&self) -> bool {
        !self.backend_url.trim().is_empty()
    }

    /// Poll options for render sessions
    ///
    /// Without any explicit bound, the default attempt limit applies.
    pub fn poll_options(&self) -> PollOptions {
        let max_attempts = match (self.max_attempts, self.max_duration) {
            (None, None) => Some(DEFAULT_MAX_ATTEMPTS),
            (attempts, _) => attempts,
        };

        PollOptions::default()
            .with_interval(self.poll_interval)
            .with_max_attempts(max_attempts)
            .with_max_duration(self.max_duration)
    }

    /// Validates the configuration
    ///
    /// An empty backend URL is valid: requests then fail immediately.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.backend_url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("backend_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_attempts == Some(0) {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.max_duration.is_some_and(|d| d.is_zero()) {
            anyhow::bail!("max_duration must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            contract: BackendContract::Polling,
            poll_interval: Duration::from_secs(3),
            max_attempts: None,
            max_duration: None,
        }
    }
}
