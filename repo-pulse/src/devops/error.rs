//! Azure DevOps API error types.

use thiserror::Error;

/// Errors that can occur while talking to the Azure DevOps REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Azure DevOps returned HTTP {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// The token was rejected. Azure DevOps signals this with 401 or with a
    /// 203 sign-in page.
    #[error("Azure DevOps rejected the credentials for {url}")]
    Unauthorized { url: String },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// An endpoint URL could not be built from the configuration.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// A pipeline id is not a build definition number.
    #[error("Pipeline id '{pipeline_id}' is not a number")]
    InvalidPipelineId { pipeline_id: String },
}

impl ApiError {
    /// Returns the HTTP status code when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
