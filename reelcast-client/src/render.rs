//! Render-related API endpoints

use crate::BackendClient;
use crate::error::{ClientError, Result};
use reelcast_core::domain::job::{JobHandle, JobStatus};
use reelcast_core::domain::render::RenderKind;
use reelcast_core::dto::render::{RenderRequest, RenderStatusResponse, StartRenderResponse};

impl BackendClient {
    // =============================================================================
    // Polling Contract
    // =============================================================================

    /// Start a render job
    ///
    /// # Arguments
    /// * `kind` - Which video to render
    ///
    /// # Returns
    /// The handle of the started job. A response without a non-empty
    /// `job_id` is a [`ClientError::ParseError`].
    ///
    /// # Example
    /// ```no_run
    /// # use reelcast_client::BackendClient;
    /// # use reelcast_core::domain::render::RenderKind;
    /// # async fn example() -> reelcast_client::Result<()> {
    /// let client = BackendClient::new("http://localhost:8000");
    /// let handle = client.start_render(RenderKind::Short).await?;
    /// println!("started {}", handle);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_render(&self, kind: RenderKind) -> Result<JobHandle> {
        let url = self.endpoint("/api/render")?;
        let response = self
            .client
            .post(&url)
            .json(&RenderRequest { kind })
            .send()
            .await?;

        let body: StartRenderResponse = self.handle_response(response).await?;
        body.into_handle()
            .ok_or_else(|| ClientError::ParseError("response is missing job_id".to_string()))
    }

    /// Query the status of a render job
    ///
    /// # Arguments
    /// * `handle` - The job to query
    ///
    /// # Returns
    /// The normalized job status
    pub async fn render_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        let url = self.endpoint("/api/render/status")?;
        let response = self
            .client
            .get(&url)
            .query(&[("job_id", handle.as_str())])
            .send()
            .await?;

        let body: RenderStatusResponse = self.handle_response(response).await?;
        Ok(body.into_status())
    }

    // =============================================================================
    // Direct Contract
    // =============================================================================

    /// Render a video synchronously
    ///
    /// Only valid against backends that answer `POST /api/render` with the
    /// video itself rather than a job id.
    ///
    /// # Returns
    /// The rendered video bytes
    pub async fn render_direct(&self, kind: RenderKind) -> Result<Vec<u8>> {
        let url = self.endpoint("/api/render")?;
        let response = self
            .client
            .post(&url)
            .json(&RenderRequest { kind })
            .send()
            .await?;

        self.handle_bytes_response(response).await
    }
}
