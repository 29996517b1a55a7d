//! Render request domain types

use serde::{Deserialize, Serialize};

/// Which video format the backend should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    /// Vertical short-form clip
    Short,
    /// Long-form video
    Long,
}

impl RenderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderKind::Short => "short",
            RenderKind::Long => "long",
        }
    }
}

impl std::fmt::Display for RenderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(RenderKind::Short),
            "long" => Ok(RenderKind::Long),
            other => Err(format!("unknown render type '{}' (expected short or long)", other)),
        }
    }
}

/// How the backend answers a render request
///
/// Deployments expose one of two incompatible flows on the same path; the
/// caller's configuration picks which one is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendContract {
    /// `POST /api/render` returns a job id, progress is read from the status endpoint
    #[default]
    Polling,
    /// `POST /api/render` returns the rendered video in the response body
    Direct,
}

impl std::fmt::Display for BackendContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendContract::Polling => write!(f, "polling"),
            BackendContract::Direct => write!(f, "direct"),
        }
    }
}

impl std::str::FromStr for BackendContract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polling" => Ok(BackendContract::Polling),
            "direct" => Ok(BackendContract::Direct),
            other => Err(format!(
                "unknown backend contract '{}' (expected polling or direct)",
                other
            )),
        }
    }
}
