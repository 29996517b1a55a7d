//! Render DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobHandle, JobStatus};
use crate::domain::render::RenderKind;

/// Body of `POST /api/render`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    #[serde(rename = "type")]
    pub kind: RenderKind,
}

/// Response of `POST /api/render` under the polling contract
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRenderResponse {
    #[serde(default)]
    pub job_id: Option<String>,
}

impl StartRenderResponse {
    /// The job handle, if the backend returned a non-empty `job_id`
    pub fn into_handle(self) -> Option<JobHandle> {
        self.job_id.and_then(JobHandle::new)
    }
}

/// Response of `GET /api/render/status`
///
/// `status` is open-ended. Only the exact labels `done`, `failed` and `error`
/// are terminal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderStatusResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RenderStatusResponse {
    /// Normalizes the raw response into a [`JobStatus`]
    pub fn into_status(self) -> JobStatus {
        match self.status.as_str() {
            "done" => JobStatus::Done {
                result_url: self.video_url.filter(|url| !url.is_empty()),
            },
            "failed" | "error" => JobStatus::Failed {
                message: self
                    .error
                    .or(self.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
            "pending" | "queued" => JobStatus::Pending,
            _ => JobStatus::Running {
                label: self.status,
                message: self.message,
            },
        }
    }
}
