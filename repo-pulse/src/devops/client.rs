//! reqwest-backed Azure DevOps client.

use crate::config::AzureDevOpsSettings;
use crate::devops::models::{
    Build, DefinitionReference, GitPullRequest, ListResponse, NewPullRequest, PullRequestUpdate,
    QueueBuildRequest,
};
use crate::devops::{ApiError, DevOpsApi};
use crate::rate_limit::{retry_after_secs, wait_for_retry_after, wait_if_needed, RateLimitInfo};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// REST API version sent with every request.
pub const API_VERSION: &str = "7.1";

/// Default timeout applied to each request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Attempts per request when the server throttles with `Retry-After`.
const MAX_ATTEMPTS: u32 = 2;

/// Longest error body kept in [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Client for one Azure DevOps organization.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    base_url: Url,
    organization: String,
    token: String,
}

impl AzureDevOpsClient {
    /// Creates a client with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(settings: &AzureDevOpsSettings, token: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(settings, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(
        settings: &AzureDevOpsSettings,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(settings.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repo-pulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            organization: settings.organization.clone(),
            token: token.into(),
        })
    }

    /// Builds `{base}/{organization}/{project}/_apis/{segments}?api-version=..`.
    fn endpoint(&self, project: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&self.organization)
            .push(project)
            .push("_apis")
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    async fn execute<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(%method, url = %url, attempt, "Sending request");

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .basic_auth("", Some(&self.token));
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                if let Some(secs) = retry_after_secs(response.headers()) {
                    warn!(url = %url, retry_after = secs, "Throttled by Azure DevOps");
                    wait_for_retry_after(secs).await;
                    continue;
                }
            }

            // A 203 is the sign-in page served for an invalid token.
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::NON_AUTHORITATIVE_INFORMATION
            {
                return Err(ApiError::Unauthorized {
                    url: url.to_string(),
                });
            }

            if !status.is_success() {
                let mut message = response.text().await.unwrap_or_default();
                if message.len() > MAX_ERROR_BODY {
                    let mut cut = MAX_ERROR_BODY;
                    while !message.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    message.truncate(cut);
                }
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                    message,
                });
            }

            let rate_limit = RateLimitInfo::from_headers(response.headers());
            let bytes = response.bytes().await?;
            if let Some(info) = rate_limit {
                wait_if_needed(&info).await;
            }

            return serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
                url: url.to_string(),
                source: e,
            });
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, url, None).await
    }
}

fn parse_pipeline_id(pipeline_id: &str) -> Result<u64, ApiError> {
    pipeline_id
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidPipelineId {
            pipeline_id: pipeline_id.to_string(),
        })
}

#[async_trait]
impl DevOpsApi for AzureDevOpsClient {
    async fn list_pull_requests(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<Vec<GitPullRequest>, ApiError> {
        let mut url = self.endpoint(
            project,
            &["git", "repositories", repository, "pullrequests"],
        )?;
        url.query_pairs_mut()
            .append_pair("searchCriteria.status", "active");

        let list: ListResponse<GitPullRequest> = self.get(url).await?;
        Ok(list.value)
    }

    async fn update_pull_request(
        &self,
        project: &str,
        repository: &str,
        pull_request_id: u64,
        update: &PullRequestUpdate,
    ) -> Result<GitPullRequest, ApiError> {
        let id = pull_request_id.to_string();
        let url = self.endpoint(
            project,
            &["git", "repositories", repository, "pullrequests", &id],
        )?;
        self.execute(Method::PATCH, url, Some(update)).await
    }

    async fn create_pull_request(
        &self,
        project: &str,
        repository: &str,
        request: &NewPullRequest,
    ) -> Result<GitPullRequest, ApiError> {
        let url = self.endpoint(
            project,
            &["git", "repositories", repository, "pullrequests"],
        )?;
        self.execute(Method::POST, url, Some(request)).await
    }

    async fn latest_build(
        &self,
        project: &str,
        pipeline_id: &str,
        branch_ref: &str,
    ) -> Result<Option<Build>, ApiError> {
        let definition = parse_pipeline_id(pipeline_id)?;
        let mut url = self.endpoint(project, &["build", "builds"])?;
        url.query_pairs_mut()
            .append_pair("definitions", &definition.to_string())
            .append_pair("branchName", branch_ref)
            .append_pair("queryOrder", "queueTimeDescending")
            .append_pair("$top", "1");

        let list: ListResponse<Build> = self.get(url).await?;
        Ok(list.value.into_iter().next())
    }

    async fn queue_build(
        &self,
        project: &str,
        pipeline_id: &str,
        source_branch: &str,
    ) -> Result<Build, ApiError> {
        let request = QueueBuildRequest {
            definition: DefinitionReference {
                id: parse_pipeline_id(pipeline_id)?,
            },
            source_branch: source_branch.to_string(),
        };
        let url = self.endpoint(project, &["build", "builds"])?;
        self.execute(Method::POST, url, Some(&request)).await
    }
}
