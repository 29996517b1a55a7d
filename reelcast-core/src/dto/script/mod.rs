//! Script DTOs

use serde::{Deserialize, Serialize};

use crate::domain::render::RenderKind;

/// Body of `POST /api/script`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRequest {
    #[serde(rename = "type")]
    pub kind: RenderKind,
}

/// Response of `POST /api/script`
///
/// The script text and a download locator for the same script. Either may be
/// missing depending on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<RenderKind>,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub download_url: Option<String>,
}
