//! Access to the Azure DevOps Git and Build REST APIs.
//!
//! The [`DevOpsApi`] trait is the seam between the aggregation logic and the
//! network: [`AzureDevOpsClient`] implements it over HTTP, tests implement it
//! in memory.

mod client;
mod error;
pub mod models;

pub use client::{AzureDevOpsClient, API_VERSION, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
pub use models::{Build, GitPullRequest, IdentityRef, NewPullRequest, PullRequestUpdate};

use crate::config::AzureDevOpsSettings;
use async_trait::async_trait;

/// Operations RepoPulse needs from the hosting platform.
#[async_trait]
pub trait DevOpsApi: Send + Sync {
    /// Lists the active pull requests of a repository.
    async fn list_pull_requests(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<Vec<GitPullRequest>, ApiError>;

    /// Applies a partial update to a pull request.
    async fn update_pull_request(
        &self,
        project: &str,
        repository: &str,
        pull_request_id: u64,
        update: &PullRequestUpdate,
    ) -> Result<GitPullRequest, ApiError>;

    /// Opens a new pull request.
    async fn create_pull_request(
        &self,
        project: &str,
        repository: &str,
        request: &NewPullRequest,
    ) -> Result<GitPullRequest, ApiError>;

    /// Returns the most recently queued run of a pipeline for a ref, if any.
    async fn latest_build(
        &self,
        project: &str,
        pipeline_id: &str,
        branch_ref: &str,
    ) -> Result<Option<Build>, ApiError>;

    /// Queues a new run of a pipeline.
    async fn queue_build(
        &self,
        project: &str,
        pipeline_id: &str,
        source_branch: &str,
    ) -> Result<Build, ApiError>;
}

/// Browser link of a pull request.
#[must_use]
pub fn pull_request_web_url(
    settings: &AzureDevOpsSettings,
    project: &str,
    repository: &str,
    pull_request_id: u64,
) -> String {
    format!(
        "{}/{}/{}/_git/{}/pullrequest/{}",
        settings.base_url.trim_end_matches('/'),
        settings.organization,
        project,
        repository,
        pull_request_id
    )
}

/// Prefixes a branch name with `refs/heads/` unless it already is a full ref.
#[must_use]
pub fn branch_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{branch}")
    }
}
