//! Aggregate pull request types.

use crate::builds::BuildStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// Draft/active state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestStatus {
    Draft,
    Active,
}

impl PullRequestStatus {
    /// Maps the platform's `isDraft` flag.
    #[must_use]
    pub fn from_draft_flag(is_draft: bool) -> Self {
        if is_draft {
            Self::Draft
        } else {
            Self::Active
        }
    }

    /// Returns the status as a string for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
        }
    }
}

/// One repository's pull request within an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRepositoryEntry {
    /// Repository name.
    pub name: String,

    /// Platform id of this repository's pull request.
    pub pull_request_id: u64,

    /// Source ref of the pull request.
    pub branch: String,

    /// Browser link to the pull request.
    pub pr_url: String,

    /// Draft/active state of this repository's pull request.
    pub status: PullRequestStatus,

    /// Latest build for this change; `None` until resolved or when nothing was found.
    pub build_status: Option<BuildStatus>,
}

/// Same-titled bot pull requests across repositories, treated as one change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePullRequest {
    /// Id of the first pull request discovered for this title.
    pub id: u64,

    /// Grouping key.
    pub title: String,

    /// Entries in discovery order, at most one per repository.
    pub repositories: Vec<PullRequestRepositoryEntry>,

    /// Head commit of each repository's pull request, by repository name.
    pub last_merge_source_commit: BTreeMap<String, String>,
}

impl AggregatePullRequest {
    /// Creates an empty aggregate seeded with its first pull request id.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            repositories: Vec::new(),
            last_merge_source_commit: BTreeMap::new(),
        }
    }

    /// Whether an entry for `repository` is already present.
    #[must_use]
    pub fn contains_repository(&self, repository: &str) -> bool {
        self.repositories.iter().any(|entry| entry.name == repository)
    }

    /// Adds an entry unless the repository is already present.
    ///
    /// Returns `true` when the entry was added.
    pub fn push_entry(&mut self, entry: PullRequestRepositoryEntry) -> bool {
        if self.contains_repository(&entry.name) {
            return false;
        }
        self.repositories.push(entry);
        true
    }

    /// Looks up the entry of a repository.
    #[must_use]
    pub fn entry(&self, repository: &str) -> Option<&PullRequestRepositoryEntry> {
        self.repositories.iter().find(|entry| entry.name == repository)
    }

    /// Draft while any repository's pull request is still a draft.
    #[must_use]
    pub fn status(&self) -> PullRequestStatus {
        if self
            .repositories
            .iter()
            .any(|entry| entry.status == PullRequestStatus::Draft)
        {
            PullRequestStatus::Draft
        } else {
            PullRequestStatus::Active
        }
    }
}

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Aggregates in first-seen-title order.
    pub aggregates: Vec<AggregatePullRequest>,

    /// Repositories whose pull requests or builds could not be fetched.
    pub failed_repositories: Vec<String>,
}

impl Aggregation {
    /// Notes a failed repository once.
    pub fn record_failure(&mut self, repository: &str) {
        if !self.failed_repositories.iter().any(|name| name == repository) {
            self.failed_repositories.push(repository.to_string());
        }
    }

    /// Returns true if any repository failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed_repositories.is_empty()
    }
}
