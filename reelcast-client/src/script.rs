//! Script-related API endpoints

use crate::BackendClient;
use crate::error::Result;
use reelcast_core::domain::render::RenderKind;
use reelcast_core::dto::script::{ScriptRequest, ScriptResponse};

impl BackendClient {
    /// Generate a script
    ///
    /// The script endpoint answers synchronously; there is no job to poll.
    ///
    /// # Arguments
    /// * `kind` - Which script format to generate
    ///
    /// # Returns
    /// The script text and its download locator
    pub async fn generate_script(&self, kind: RenderKind) -> Result<ScriptResponse> {
        let url = self.endpoint("/api/script")?;
        let response = self
            .client
            .post(&url)
            .json(&ScriptRequest { kind })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
