//! Build run summary attached to repositories and pull requests.

use crate::builds::BuildOutcome;
use crate::devops::Build;
use serde::Serialize;

/// The build run chosen for a repository entry.
///
/// Keeps the platform's own `status`/`result` strings next to the normalized
/// [`BuildOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    /// Build id.
    pub id: u64,

    /// Platform status, e.g. `inProgress`.
    pub status: Option<String>,

    /// Platform result, e.g. `succeeded`.
    pub result: Option<String>,

    /// Browser link to the run.
    pub url: Option<String>,

    /// Ref the run was found under.
    pub source_ref: String,

    /// Normalized outcome.
    pub outcome: BuildOutcome,
}

impl BuildStatus {
    /// Summarizes a build found under `source_ref`.
    #[must_use]
    pub fn from_build(build: &Build, source_ref: &str) -> Self {
        Self {
            id: build.id,
            status: build.status.clone(),
            result: build.result.clone(),
            url: build.web_url().map(str::to_string),
            source_ref: source_ref.to_string(),
            outcome: BuildOutcome::normalize(build.result.as_deref(), build.status.as_deref()),
        }
    }
}
