//! Observation types delivered to poll callers

use chrono::{DateTime, Utc};
use reelcast_core::domain::job::{JobHandle, JobStatus};

use super::PollError;

/// One non-terminal status observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub job: JobHandle,
    /// 1-based number of the status query that produced this observation
    pub attempt: u32,
    pub status: JobStatus,
    pub observed_at: DateTime<Utc>,
}

/// Success value of a poll session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job: JobHandle,
    /// Where the rendered result can be downloaded, if the backend said
    pub result_url: Option<String>,
    /// Number of status queries issued
    pub attempts: u32,
}

/// Receives the observations of a poll session
///
/// Callbacks run on the session's task, in the order the status queries were
/// issued. `on_finish` is called at most once, and never after the session
/// was cancelled.
pub trait PollObserver: Send + 'static {
    /// Called for every non-terminal status
    fn on_update(&mut self, update: &ProgressUpdate);

    /// Called once with the terminal result
    fn on_finish(&mut self, _result: &Result<JobOutcome, PollError>) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn on_update(&mut self, _update: &ProgressUpdate) {}
}
