//! Poll session errors

use std::time::Duration;

use thiserror::Error;

use crate::error::ClientError;

/// Why a render job did not produce a result
///
/// `Submission`, `Query`, `TimedOut` and `JobFailed` are the terminal
/// failures of a session and exclude each other. `InvalidOptions` is raised
/// before any session exists.
#[derive(Debug, Error)]
pub enum PollError {
    /// The start call failed or returned no job id
    #[error("Submission failed: {0}")]
    Submission(#[source] ClientError),

    /// A status query failed
    #[error("Status query failed: {0}")]
    Query(#[source] ClientError),

    /// No terminal status within the configured bound
    #[error("Timed out after {attempts} status check(s) ({elapsed:?})")]
    TimedOut { attempts: u32, elapsed: Duration },

    /// The backend reported the job as failed
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Invalid poll options: {0}")]
    InvalidOptions(String),
}

impl PollError {
    /// Stable name of the error kind, for display and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Submission(_) => "submission",
            PollError::Query(_) => "query",
            PollError::TimedOut { .. } => "timeout",
            PollError::JobFailed(_) => "job_failed",
            PollError::InvalidOptions(_) => "invalid_options",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            PollError::Submission(ClientError::NotConfigured).kind(),
            "submission"
        );
        assert_eq!(PollError::JobFailed("x".to_string()).kind(), "job_failed");
        assert_eq!(
            PollError::TimedOut {
                attempts: 3,
                elapsed: Duration::from_secs(9)
            }
            .to_string(),
            "Timed out after 3 status check(s) (9s)"
        );
    }
}
