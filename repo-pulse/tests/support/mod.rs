#![allow(dead_code)]

use async_trait::async_trait;
use repo_pulse::config::{
    default_base_url, default_update_description_format, default_update_title_format,
    AzureDevOpsSettings, Configuration, RenovateSettings, RepositoryConfig,
    UpdatePullRequestSettings,
};
use repo_pulse::devops::models::GitCommitRef;
use repo_pulse::devops::{
    ApiError, Build, DevOpsApi, GitPullRequest, IdentityRef, NewPullRequest, PullRequestUpdate,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const BOT: &str = "renovate[bot]";

/// Configuration for `repos` as `(name, pipeline id)` pairs in project `proj`.
pub fn config(repos: &[(&str, &str)]) -> Configuration {
    Configuration {
        azure_dev_ops: AzureDevOpsSettings {
            base_url: default_base_url(),
            organization: "org".to_string(),
            project: Some("proj".to_string()),
            personal_access_token: "pat".to_string(),
        },
        repositories: repos
            .iter()
            .map(|(name, pipeline)| RepositoryConfig {
                name: (*name).to_string(),
                project: None,
                url: format!("https://dev.azure.com/org/proj/_git/{name}"),
                pipeline_id: (*pipeline).to_string(),
                branch: "main".to_string(),
            })
            .collect(),
        renovate: RenovateSettings {
            enabled: true,
            bot_name: BOT.to_string(),
            auto_merge: false,
        },
        update_pull_requests: UpdatePullRequestSettings {
            title_format: default_update_title_format(),
            description_format: default_update_description_format(),
            draft: false,
        },
    }
}

pub fn pr(id: u64, title: &str, author: &str, draft: bool) -> GitPullRequest {
    GitPullRequest {
        pull_request_id: id,
        title: title.to_string(),
        created_by: IdentityRef {
            display_name: Some(author.to_string()),
            unique_name: None,
            id: None,
        },
        is_draft: draft,
        source_ref_name: format!("refs/heads/renovate/pr-{id}"),
        target_ref_name: "refs/heads/main".to_string(),
        status: Some("active".to_string()),
        last_merge_source_commit: Some(GitCommitRef {
            commit_id: format!("commit-{id}"),
        }),
        url: None,
    }
}

pub fn build(id: u64, status: Option<&str>, result: Option<&str>) -> Build {
    Build {
        id,
        build_number: Some(format!("2024.{id}")),
        status: status.map(str::to_string),
        result: result.map(str::to_string),
        source_branch: None,
        url: Some(format!("https://dev.azure.com/org/proj/_apis/build/Builds/{id}")),
        links: None,
    }
}

fn unavailable(what: &str) -> ApiError {
    ApiError::Status {
        status: 503,
        url: format!("https://fake/{what}"),
        message: "Service Unavailable".to_string(),
    }
}

/// In-memory [`DevOpsApi`] that records every call.
#[derive(Default)]
pub struct FakeApi {
    pull_requests: HashMap<String, Vec<GitPullRequest>>,
    failing_lists: HashSet<String>,
    builds: HashMap<(String, String), Build>,
    failing_builds: HashSet<(String, String)>,
    failing_repositories: HashSet<String>,
    failing_pipelines: HashSet<String>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<(String, u64, PullRequestUpdate)>>,
    created: Mutex<Vec<(String, NewPullRequest)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_requests(mut self, repository: &str, prs: Vec<GitPullRequest>) -> Self {
        self.pull_requests.insert(repository.to_string(), prs);
        self
    }

    /// Listing `repository` fails with a 503.
    pub fn failing_list(mut self, repository: &str) -> Self {
        self.failing_lists.insert(repository.to_string());
        self
    }

    pub fn with_build(mut self, pipeline_id: &str, git_ref: &str, build: Build) -> Self {
        self.builds
            .insert((pipeline_id.to_string(), git_ref.to_string()), build);
        self
    }

    pub fn failing_build(mut self, pipeline_id: &str, git_ref: &str) -> Self {
        self.failing_builds
            .insert((pipeline_id.to_string(), git_ref.to_string()));
        self
    }

    pub fn failing_pipeline(mut self, pipeline_id: &str) -> Self {
        self.failing_pipelines.insert(pipeline_id.to_string());
        self
    }

    /// Pull request updates and creation in `repository` fail with a 503.
    pub fn failing_writes(mut self, repository: &str) -> Self {
        self.failing_repositories.insert(repository.to_string());
        self
    }

    /// Listing pull requests waits until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, u64, PullRequestUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, NewPullRequest)> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DevOpsApi for FakeApi {
    async fn list_pull_requests(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<Vec<GitPullRequest>, ApiError> {
        self.record(format!("list {project}/{repository}"));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing_lists.contains(repository) {
            return Err(unavailable(repository));
        }
        Ok(self
            .pull_requests
            .get(repository)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_pull_request(
        &self,
        project: &str,
        repository: &str,
        pull_request_id: u64,
        update: &PullRequestUpdate,
    ) -> Result<GitPullRequest, ApiError> {
        self.record(format!("update {project}/{repository}/{pull_request_id}"));
        if self.failing_repositories.contains(repository) {
            return Err(unavailable(repository));
        }
        self.updates.lock().unwrap().push((
            repository.to_string(),
            pull_request_id,
            update.clone(),
        ));
        Ok(pr(pull_request_id, "updated", BOT, false))
    }

    async fn create_pull_request(
        &self,
        project: &str,
        repository: &str,
        request: &NewPullRequest,
    ) -> Result<GitPullRequest, ApiError> {
        self.record(format!("create {project}/{repository}"));
        if self.failing_repositories.contains(repository) {
            return Err(unavailable(repository));
        }
        let mut created = self.created.lock().unwrap();
        created.push((repository.to_string(), request.clone()));
        Ok(pr(100 + created.len() as u64, &request.title, "someone", request.is_draft))
    }

    async fn latest_build(
        &self,
        project: &str,
        pipeline_id: &str,
        branch_ref: &str,
    ) -> Result<Option<Build>, ApiError> {
        self.record(format!("build {project}/{pipeline_id}@{branch_ref}"));
        let key = (pipeline_id.to_string(), branch_ref.to_string());
        if self.failing_builds.contains(&key) {
            return Err(unavailable(pipeline_id));
        }
        Ok(self.builds.get(&key).cloned())
    }

    async fn queue_build(
        &self,
        project: &str,
        pipeline_id: &str,
        source_branch: &str,
    ) -> Result<Build, ApiError> {
        self.record(format!("queue {project}/{pipeline_id}@{source_branch}"));
        if self.failing_pipelines.contains(pipeline_id) {
            return Err(unavailable(pipeline_id));
        }
        Ok(build(500, Some("notStarted"), None))
    }
}
