//! Job domain types

use serde::{Deserialize, Serialize};

/// Opaque identifier of a render job, as returned by the start call
///
/// A handle is never empty: [`JobHandle::new`] rejects blank identifiers so a
/// start response without a usable `job_id` can't start a polling session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobHandle(String);

impl JobHandle {
    /// Wraps a backend job identifier, or `None` if it is blank
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for JobHandle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        JobHandle::new(value).ok_or_else(|| "job id must not be empty".to_string())
    }
}

impl From<JobHandle> for String {
    fn from(handle: JobHandle) -> Self {
        handle.0
    }
}

/// Observed status of a render job
///
/// Exactly one state holds per observation. `Done` and `Failed` are terminal;
/// everything else means the job is still in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted by the backend but not started yet
    Pending,

    /// In progress. `label` is the raw status string the backend sent, so
    /// labels this client doesn't know about are kept rather than rejected.
    Running {
        label: String,
        message: Option<String>,
    },

    /// Finished; `result_url` locates the rendered output when the backend
    /// provides one
    Done { result_url: Option<String> },

    /// The backend reported a failure
    Failed { message: String },
}

impl JobStatus {
    /// Whether no further transition can follow this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done { .. } | JobStatus::Failed { .. })
    }

    /// Short label for display and logs
    pub fn label(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running { label, .. } => label,
            JobStatus::Done { .. } => "done",
            JobStatus::Failed { .. } => "failed",
        }
    }

    /// Human-readable progress or failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            JobStatus::Running { message, .. } => message.as_deref(),
            JobStatus::Failed { message } => Some(message),
            JobStatus::Pending | JobStatus::Done { .. } => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{} ({})", self.label(), message),
            None => f.write_str(self.label()),
        }
    }
}
