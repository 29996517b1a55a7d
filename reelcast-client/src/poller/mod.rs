//! Job poller
//!
//! Submits render jobs and follows them until they finish. Each followed job
//! runs in its own [`PollSession`]: a tokio task that waits, queries the
//! status once, reports the observation and repeats, until the job is done,
//! fails, a query fails, the configured bound is hit, or the session is
//! cancelled. Nothing is retried: one failed query ends the session.

mod error;
mod observer;
mod options;
mod session;

pub use error::PollError;
pub use observer::{JobOutcome, NoopObserver, PollObserver, ProgressUpdate};
pub use options::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollOptions};
pub use session::{PollSession, SessionHandle, SessionState};

use std::sync::Arc;

use reelcast_core::domain::job::JobHandle;
use reelcast_core::domain::render::RenderKind;
use tracing::{info, warn};

use crate::backend::RenderBackend;

/// Submits render jobs and spawns poll sessions for them
#[derive(Clone)]
pub struct JobPoller {
    backend: Arc<dyn RenderBackend>,
}

impl JobPoller {
    /// Creates a new job poller on top of a backend
    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        Self { backend }
    }

    /// Starts a render job
    ///
    /// Any failure of the start call, including a response without a job id
    /// or a missing backend, is a [`PollError::Submission`].
    pub async fn submit(&self, kind: RenderKind) -> Result<JobHandle, PollError> {
        match self.backend.start_render(kind).await {
            Ok(job) => {
                info!("Submitted {} render job {}", kind, job);
                Ok(job)
            }
            Err(e) => {
                warn!("Failed to submit {} render job: {}", kind, e);
                Err(PollError::Submission(e))
            }
        }
    }

    /// Starts polling an already submitted job
    ///
    /// Must be called within a tokio runtime. The first status query happens
    /// one `interval` after this call.
    pub fn poll<O: PollObserver>(
        &self,
        job: JobHandle,
        options: PollOptions,
        observer: O,
    ) -> Result<PollSession, PollError> {
        options.validate()?;
        Ok(PollSession::spawn(
            Arc::clone(&self.backend),
            job,
            options,
            observer,
        ))
    }

    /// Submits a render job and starts polling it
    pub async fn start<O: PollObserver>(
        &self,
        kind: RenderKind,
        options: PollOptions,
        observer: O,
    ) -> Result<PollSession, PollError> {
        options.validate()?;
        let job = self.submit(kind).await?;
        self.poll(job, options, observer)
    }
}
