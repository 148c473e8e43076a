//! Pipeline status of a configured repository.

use crate::builds::{BuildOutcome, BuildStatus};
use serde::Serialize;

/// Latest run of a repository's pipeline on its configured branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatus {
    /// Repository name.
    pub name: String,

    /// Build definition id.
    pub pipeline_id: String,

    /// Branch the pipeline was looked up on.
    pub branch: String,

    /// Browser link to the repository.
    pub web_url: String,

    /// Latest run, if one was found.
    pub build: Option<BuildStatus>,

    /// Why the lookup failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryStatus {
    /// Normalized outcome, `Unknown` when no run was found.
    #[must_use]
    pub fn outcome(&self) -> BuildOutcome {
        self.build
            .as_ref()
            .map_or(BuildOutcome::Unknown, |build| build.outcome)
    }

    /// Whether the pipeline could not be queried.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
