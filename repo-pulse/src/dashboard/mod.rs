//! Ties configuration, API client and action handlers together.

mod error;

pub use error::DashboardError;

use crate::actions::{
    complete_pull_request, create_update_pull_requests, publish_pull_request, trigger_pipelines,
};
use crate::aggregation::{aggregate_pull_requests, AggregatePullRequest, Aggregation};
use crate::builds::{resolve_build_statuses, resolve_repository_statuses, RepositoryStatus};
use crate::config::{resolve_token, Configuration};
use crate::devops::{AzureDevOpsClient, DevOpsApi};
use crate::summary::ActionResult;
use crate::templates::TemplateRenderer;
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};

/// Default number of API requests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Entry point for every RepoPulse operation.
pub struct Dashboard {
    config: Configuration,
    api: Box<dyn DevOpsApi>,
    renderer: TemplateRenderer,
    concurrency: usize,
    refresh_lock: Mutex<()>,
}

impl Dashboard {
    /// Builds a dashboard talking to Azure DevOps over HTTP.
    ///
    /// `token` takes precedence over [`resolve_token`].
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::MissingToken`] when no token is available,
    /// or an API error when the base URL is invalid.
    pub fn new(
        config: Configuration,
        token: Option<String>,
        concurrency: usize,
    ) -> Result<Self, DashboardError> {
        let token = token
            .filter(|token| !token.trim().is_empty())
            .or_else(|| resolve_token(&config.azure_dev_ops))
            .ok_or(DashboardError::MissingToken)?;
        let client = AzureDevOpsClient::new(&config.azure_dev_ops, token)?;
        Ok(Self::with_api(config, Box::new(client), concurrency))
    }

    /// Builds a dashboard over any [`DevOpsApi`] implementation.
    #[must_use]
    pub fn with_api(config: Configuration, api: Box<dyn DevOpsApi>, concurrency: usize) -> Self {
        Self {
            config,
            api,
            renderer: TemplateRenderer::new(),
            concurrency: concurrency.max(1),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Returns the max concurrent API requests.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Recomputes every aggregate and its build statuses from scratch.
    ///
    /// Repositories whose pull requests or builds could not be fetched are
    /// listed in [`Aggregation::failed_repositories`].
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::RefreshInProgress`] when called while
    /// another refresh is still running.
    pub async fn refresh(&self) -> Result<Aggregation, DashboardError> {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            warn!("Refresh requested while another is running");
            return Err(DashboardError::RefreshInProgress);
        };

        let span = info_span!("refresh");
        async {
            let mut aggregation =
                aggregate_pull_requests(self.api.as_ref(), &self.config, self.concurrency).await;
            let failed = resolve_build_statuses(
                self.api.as_ref(),
                &self.config,
                &mut aggregation.aggregates,
                self.concurrency,
            )
            .await;
            for repository in &failed {
                aggregation.record_failure(repository);
            }
            info!(
                aggregates = aggregation.aggregates.len(),
                failed = aggregation.failed_repositories.len(),
                "Refresh complete"
            );
            Ok(aggregation)
        }
        .instrument(span)
        .await
    }

    /// Reports the latest pipeline run of every configured repository.
    pub async fn repository_statuses(&self) -> Vec<RepositoryStatus> {
        resolve_repository_statuses(self.api.as_ref(), &self.config, self.concurrency).await
    }

    /// Publishes every draft of the aggregate titled `title`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::PullRequestNotFound`] when no aggregate has
    /// that title.
    pub async fn publish(&self, title: &str) -> Result<Vec<ActionResult>, DashboardError> {
        let aggregate = self.find_aggregate(title).await?;
        Ok(publish_pull_request(self.api.as_ref(), &self.config, &aggregate, self.concurrency).await)
    }

    /// Completes every pull request of the aggregate titled `title`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::PullRequestNotFound`] when no aggregate has
    /// that title.
    pub async fn complete(&self, title: &str) -> Result<Vec<ActionResult>, DashboardError> {
        let aggregate = self.find_aggregate(title).await?;
        Ok(complete_pull_request(self.api.as_ref(), &self.config, &aggregate, self.concurrency).await)
    }

    /// Queues pipeline runs for all repositories, or just `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::RepositoryNotFound`] for an unknown name.
    pub async fn trigger(
        &self,
        repository: Option<&str>,
    ) -> Result<Vec<ActionResult>, DashboardError> {
        if let Some(name) = repository {
            if self.config.repository(name).is_none() {
                return Err(DashboardError::RepositoryNotFound {
                    name: name.to_string(),
                });
            }
        }
        Ok(trigger_pipelines(self.api.as_ref(), &self.config, repository, self.concurrency).await)
    }

    /// Opens a pull request from each configured branch into `target_branch`.
    pub async fn create_update_prs(&self, target_branch: &str) -> Vec<ActionResult> {
        create_update_pull_requests(
            self.api.as_ref(),
            &self.config,
            &self.renderer,
            target_branch,
            self.concurrency,
        )
        .await
    }

    async fn find_aggregate(&self, title: &str) -> Result<AggregatePullRequest, DashboardError> {
        aggregate_pull_requests(self.api.as_ref(), &self.config, self.concurrency)
            .await
            .aggregates
            .into_iter()
            .find(|aggregate| aggregate.title == title)
            .ok_or_else(|| DashboardError::PullRequestNotFound {
                title: title.to_string(),
            })
    }
}
