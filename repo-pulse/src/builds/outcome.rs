//! Normalized build outcomes.

use serde::Serialize;
use std::fmt;

/// Platform-independent outcome of a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildOutcome {
    Succeeded,
    PartiallySucceeded,
    Failed,
    Canceled,
    InProgress,
    Cancelling,
    NotStarted,
    Postponed,
    Unknown,
}

impl BuildOutcome {
    /// Normalizes the platform's `(result, status)` pair.
    ///
    /// `result` wins when present; `none` counts as absent, since Azure DevOps
    /// reports it for runs that have not finished. Without a result the run
    /// is still in flight and `status` is translated instead.
    #[must_use]
    pub fn normalize(result: Option<&str>, status: Option<&str>) -> Self {
        match result.map(str::trim).filter(|r| !r.eq_ignore_ascii_case("none")) {
            Some(result) if !result.is_empty() => Self::from_result(result),
            _ => status.map_or(Self::Unknown, Self::from_status),
        }
    }

    fn from_result(result: &str) -> Self {
        match result.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "partiallysucceeded" => Self::PartiallySucceeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Unknown,
        }
    }

    fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "inprogress" => Self::InProgress,
            "cancelling" => Self::Cancelling,
            "notstarted" => Self::NotStarted,
            "postponed" => Self::Postponed,
            _ => Self::Unknown,
        }
    }

    /// Returns the outcome as a string for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::PartiallySucceeded => "partiallySucceeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::InProgress => "inProgress",
            Self::Cancelling => "cancelling",
            Self::NotStarted => "notStarted",
            Self::Postponed => "postponed",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the run has not reached a final state yet.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::Cancelling | Self::NotStarted | Self::Postponed
        )
    }

    /// Whether the run finished without errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
