//! Poll options

use std::time::Duration;

use super::PollError;

/// Default time between two status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default number of status queries before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Timing and bounds of a poll session
///
/// At least one of `max_attempts` and `max_duration` must be set: a session
/// always ends, even if the backend never finalizes the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Wait before each status query
    pub interval: Duration,

    /// Maximum number of status queries
    pub max_attempts: Option<u32>,

    /// Maximum time since the session started
    pub max_duration: Option<Duration>,
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Checks that the options describe a bounded, progressing session
    pub fn validate(&self) -> Result<(), PollError> {
        if self.interval.is_zero() {
            return Err(PollError::InvalidOptions(
                "interval must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == Some(0) {
            return Err(PollError::InvalidOptions(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.max_duration.is_some_and(|d| d.is_zero()) {
            return Err(PollError::InvalidOptions(
                "max_duration must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts.is_none() && self.max_duration.is_none() {
            return Err(PollError::InvalidOptions(
                "either max_attempts or max_duration must be set".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            max_duration: None,
        }
    }
}
