//! Wire types of the Azure DevOps Git and Build APIs.
//!
//! Only the fields RepoPulse reads are modelled; everything else in the
//! responses is ignored.

use serde::{Deserialize, Serialize};

/// Envelope used by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    /// Number of items, when the server reports it.
    #[serde(default)]
    pub count: Option<u64>,

    /// The items.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A Git pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequest {
    pub pull_request_id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub created_by: IdentityRef,

    #[serde(default)]
    pub is_draft: bool,

    /// Full source ref, e.g. `refs/heads/renovate/serde-1.x`.
    #[serde(default)]
    pub source_ref_name: String,

    #[serde(default)]
    pub target_ref_name: String,

    /// `active`, `abandoned` or `completed`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub last_merge_source_commit: Option<GitCommitRef>,

    /// API URL of the pull request resource.
    #[serde(default)]
    pub url: Option<String>,
}

/// Identity of a pull request author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub unique_name: Option<String>,

    #[serde(default)]
    pub id: Option<String>,
}

/// Reference to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    pub commit_id: String,
}

/// A build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u64,

    #[serde(default)]
    pub build_number: Option<String>,

    /// `notStarted`, `inProgress`, `cancelling`, `postponed`, `completed`.
    #[serde(default)]
    pub status: Option<String>,

    /// `succeeded`, `partiallySucceeded`, `failed`, `canceled`, `none`.
    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub source_branch: Option<String>,

    /// API URL of the build resource.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(rename = "_links", default)]
    pub links: Option<BuildLinks>,
}

impl Build {
    /// Returns the browser link of the build, falling back to the API URL.
    #[must_use]
    pub fn web_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.web.as_ref())
            .map(|link| link.href.as_str())
            .or(self.url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLinks {
    #[serde(default)]
    pub web: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Body of a pull request PATCH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_merge_source_commit: Option<GitCommitRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_options: Option<CompletionOptions>,
}

impl PullRequestUpdate {
    /// Flips a draft pull request to active.
    #[must_use]
    pub fn publish() -> Self {
        Self {
            is_draft: Some(false),
            ..Default::default()
        }
    }

    /// Completes (merges) a pull request at the given source commit.
    #[must_use]
    pub fn complete(commit_id: impl Into<String>) -> Self {
        Self {
            status: Some("completed".to_string()),
            last_merge_source_commit: Some(GitCommitRef {
                commit_id: commit_id.into(),
            }),
            completion_options: Some(CompletionOptions {
                delete_source_branch: true,
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub delete_source_branch: bool,
}

/// Body of a pull request creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPullRequest {
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub title: String,
    pub description: String,
    pub is_draft: bool,
}

/// Body of a build queue request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBuildRequest {
    pub definition: DefinitionReference,
    pub source_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionReference {
    pub id: u64,
}
