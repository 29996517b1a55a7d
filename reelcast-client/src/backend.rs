//! Backend seam for the job poller
//!
//! The poller only needs two calls from the backend. Keeping them behind a
//! trait lets the polling loop run against an in-memory backend in tests.

use async_trait::async_trait;
use reelcast_core::domain::job::{JobHandle, JobStatus};
use reelcast_core::domain::render::RenderKind;

use crate::BackendClient;
use crate::error::Result;

/// Backend operations used by [`crate::poller::JobPoller`]
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Starts a render job and returns its handle
    async fn start_render(&self, kind: RenderKind) -> Result<JobHandle>;

    /// Performs one status query for a job
    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus>;
}

#[async_trait]
impl RenderBackend for BackendClient {
    async fn start_render(&self, kind: RenderKind) -> Result<JobHandle> {
        BackendClient::start_render(self, kind).await
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        self.render_status(handle).await
    }
}
