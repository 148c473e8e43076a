//! Cross-repository aggregation of bot pull requests.
//!
//! Renovate opens one pull request per repository for the same dependency
//! bump, always with the same title. This module lists the active pull
//! requests of every configured repository, keeps those authored by the bot,
//! and merges same-titled ones into a single [`AggregatePullRequest`].

mod author;
mod model;

pub use author::is_authored_by;
pub use model::{
    AggregatePullRequest, Aggregation, PullRequestRepositoryEntry, PullRequestStatus,
};

use crate::config::{Configuration, RepositoryConfig};
use crate::devops::{pull_request_web_url, DevOpsApi, GitPullRequest};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, info_span, warn, Instrument};

/// Builds the current set of aggregates from the hosting platform.
///
/// Repositories are fetched with at most `concurrency` requests in flight.
/// A repository whose fetch fails is logged, contributes nothing and is
/// listed in [`Aggregation::failed_repositories`]; the aggregation itself
/// never fails. Returns an empty list without any API call
/// when Renovate detection is disabled.
///
/// Aggregates come back in first-seen-title order, following the configured
/// repository order and then the API response order.
pub async fn aggregate_pull_requests(
    api: &dyn DevOpsApi,
    config: &Configuration,
    concurrency: usize,
) -> Aggregation {
    if !config.renovate.enabled {
        info!("Renovate detection disabled, skipping aggregation");
        return Aggregation::default();
    }

    let span = info_span!(
        "aggregate",
        repositories = config.repositories.len(),
        bot = %config.renovate.bot_name
    );

    async {
        info!("Listing pull requests");

        // `buffered` yields in input order, so grouping below does not
        // depend on which request finishes first.
        let fetched: Vec<(&RepositoryConfig, Option<Vec<GitPullRequest>>)> =
            stream::iter(&config.repositories)
                .map(|repository| async move {
                    (repository, fetch_repository(api, config, repository).await)
                })
                .buffered(concurrency.max(1))
                .collect()
                .await;

        let mut failed = Vec::new();
        let succeeded: Vec<(&RepositoryConfig, Vec<GitPullRequest>)> = fetched
            .into_iter()
            .filter_map(|(repository, prs)| {
                if prs.is_none() {
                    failed.push(repository.name.clone());
                }
                prs.map(|prs| (repository, prs))
            })
            .collect();

        let aggregation = Aggregation {
            aggregates: group_pull_requests(config, succeeded),
            failed_repositories: failed,
        };

        info!(
            count = aggregation.aggregates.len(),
            failed = aggregation.failed_repositories.len(),
            "Aggregation complete"
        );
        aggregation
    }
    .instrument(span)
    .await
}

/// Lists one repository's pull requests, logging and swallowing failures.
async fn fetch_repository(
    api: &dyn DevOpsApi,
    config: &Configuration,
    repository: &RepositoryConfig,
) -> Option<Vec<GitPullRequest>> {
    let Some(project) = config.project_for(repository) else {
        warn!(repo = %repository.name, "No project configured, skipping repository");
        return None;
    };

    match api.list_pull_requests(project, &repository.name).await {
        Ok(pull_requests) => {
            debug!(
                repo = %repository.name,
                count = pull_requests.len(),
                "Fetched pull requests"
            );
            Some(pull_requests)
        }
        Err(e) => {
            warn!(
                repo = %repository.name,
                error = %e,
                "Failed to list pull requests, skipping repository"
            );
            None
        }
    }
}

/// Groups fetched pull requests by title.
///
/// Input order defines output order. Only pull requests authored by the
/// configured bot are considered, and each repository appears at most once
/// per aggregate.
pub fn group_pull_requests<'a>(
    config: &Configuration,
    fetched: impl IntoIterator<Item = (&'a RepositoryConfig, Vec<GitPullRequest>)>,
) -> Vec<AggregatePullRequest> {
    let mut aggregates: Vec<AggregatePullRequest> = Vec::new();
    let mut by_title: HashMap<String, usize> = HashMap::new();

    for (repository, pull_requests) in fetched {
        let project = config.project_for(repository).unwrap_or_default();

        for pr in pull_requests {
            if !is_authored_by(&pr.created_by, &config.renovate.bot_name) {
                continue;
            }

            let index = *by_title.entry(pr.title.clone()).or_insert_with(|| {
                aggregates.push(AggregatePullRequest::new(pr.pull_request_id, &pr.title));
                aggregates.len() - 1
            });
            let aggregate = &mut aggregates[index];

            let added = aggregate.push_entry(PullRequestRepositoryEntry {
                name: repository.name.clone(),
                pull_request_id: pr.pull_request_id,
                branch: pr.source_ref_name.clone(),
                pr_url: pull_request_web_url(
                    &config.azure_dev_ops,
                    project,
                    &repository.name,
                    pr.pull_request_id,
                ),
                status: PullRequestStatus::from_draft_flag(pr.is_draft),
                build_status: None,
            });

            if !added {
                warn!(
                    repo = %repository.name,
                    title = %pr.title,
                    pull_request_id = pr.pull_request_id,
                    "Repository already has a pull request with this title, ignoring"
                );
                continue;
            }

            if let Some(commit) = pr.last_merge_source_commit {
                aggregate
                    .last_merge_source_commit
                    .insert(repository.name.clone(), commit.commit_id);
            }
        }
    }

    aggregates
}
