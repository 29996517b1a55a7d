//! Reelcast HTTP Client
//!
//! A type-safe client for the render backend plus the job poller that turns
//! a render submission into an observable, cancellable, bounded completion.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reelcast_client::BackendClient;
//! use reelcast_client::poller::{JobPoller, NoopObserver, PollOptions};
//! use reelcast_core::domain::render::RenderKind;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(BackendClient::new("http://localhost:8000"));
//!     let poller = JobPoller::new(client);
//!
//!     let session = poller
//!         .start(RenderKind::Short, PollOptions::default(), NoopObserver)
//!         .await?;
//!
//!     if let Some(outcome) = session.wait().await {
//!         println!("video: {:?}", outcome?.result_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod poller;
mod render;
mod script;
pub mod slot;

// Re-export commonly used types
pub use backend::RenderBackend;
pub use error::{ClientError, Result};
pub use reelcast_core::dto::script::ScriptResponse;

use reelcast_core::dto::error::error_message;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the render backend API
///
/// Endpoints are grouped by concern:
/// - Render jobs (start, status, direct render)
/// - Scripts
/// - Downloads of result locators
///
/// An empty base URL is a valid configuration meaning "no backend available";
/// every call then fails with [`ClientError::NotConfigured`] without touching
/// the network.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Base URL of the backend (e.g., "http://localhost:8000"), possibly empty
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API, or "" for none
    ///
    /// # Example
    /// ```
    /// use reelcast_client::BackendClient;
    ///
    /// let client = BackendClient::new("http://localhost:8000");
    /// assert!(client.is_configured());
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new backend client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use reelcast_client::BackendClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = BackendClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a backend URL is configured
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Resolve a result locator against the base URL
    ///
    /// The backend hands out relative locators such as
    /// `/api/download/video/<id>`; absolute `http(s)://` locators are
    /// returned unchanged.
    pub fn absolute_url(&self, locator: &str) -> String {
        if is_absolute(locator) {
            return locator.to_string();
        }
        if locator.starts_with('/') {
            format!("{}{}", self.base_url, locator)
        } else {
            format!("{}/{}", self.base_url, locator)
        }
    }

    /// Download the bytes behind a result locator
    ///
    /// # Arguments
    /// * `locator` - Absolute URL or backend-relative path
    pub async fn download(&self, locator: &str) -> Result<Vec<u8>> {
        if locator.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "download locator is empty".to_string(),
            ));
        }
        if !self.is_configured() && !is_absolute(locator) {
            return Err(ClientError::NotConfigured);
        }

        let url = self.absolute_url(locator);
        tracing::debug!(%url, "downloading result");
        let response = self.client.get(&url).send().await?;

        self.handle_bytes_response(response).await
    }

    /// Build the full URL of an API path, failing if no backend is configured
    fn endpoint(&self, path: &str) -> Result<String> {
        if !self.is_configured() {
            return Err(ClientError::NotConfigured);
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-2xx response into an [`ClientError::ApiError`]
    ///
    /// The message is the JSON `detail`/`error` field when present, otherwise
    /// the body verbatim, otherwise the HTTP reason phrase.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        Err(ClientError::api_error(status.as_u16(), message))
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is raw bytes (videos, script files)
    async fn handle_bytes_response(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let response = Self::ensure_success(response).await?;

        Ok(response.bytes().await?.to_vec())
    }
}

fn is_absolute(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
