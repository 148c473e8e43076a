//! Action result types.

use serde::Serialize;

/// Result of running an action against a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionResult {
    /// The request succeeded.
    Success {
        /// Repository name.
        repository: String,
        /// What was done, e.g. "queued build 812".
        detail: String,
        /// Link to the affected resource, when known.
        url: Option<String>,
    },

    /// Nothing had to be done.
    Skipped {
        /// Repository name.
        repository: String,
        /// Reason for skipping.
        reason: String,
    },

    /// The request failed.
    Failed {
        /// Repository name.
        repository: String,
        /// Error message.
        error: String,
    },
}

impl ActionResult {
    /// Repository the result belongs to.
    #[must_use]
    pub fn repository(&self) -> &str {
        match self {
            Self::Success { repository, .. }
            | Self::Skipped { repository, .. }
            | Self::Failed { repository, .. } => repository,
        }
    }

    /// Returns the result kind as a string for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}
