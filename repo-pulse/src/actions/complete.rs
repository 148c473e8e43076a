//! Completing (merging) aggregated pull requests.

use crate::actions::{for_each_repository, locate};
use crate::aggregation::{AggregatePullRequest, PullRequestStatus};
use crate::config::Configuration;
use crate::devops::{DevOpsApi, PullRequestUpdate};
use crate::summary::ActionResult;
use tracing::{info, info_span, warn, Instrument};

/// Completes every pull request of an aggregate at its recorded source commit.
///
/// Drafts and entries without a recorded commit are skipped.
pub async fn complete_pull_request(
    api: &dyn DevOpsApi,
    config: &Configuration,
    aggregate: &AggregatePullRequest,
    concurrency: usize,
) -> Vec<ActionResult> {
    let span = info_span!("complete", title = %aggregate.title);

    for_each_repository(&aggregate.repositories, concurrency, |entry| async move {
        if entry.status == PullRequestStatus::Draft {
            return ActionResult::Skipped {
                repository: entry.name.clone(),
                reason: "still a draft".to_string(),
            };
        }

        let Some(commit) = aggregate.last_merge_source_commit.get(&entry.name) else {
            return ActionResult::Skipped {
                repository: entry.name.clone(),
                reason: "no source commit recorded".to_string(),
            };
        };

        let (repository, project) = match locate(config, &entry.name) {
            Ok(found) => found,
            Err(result) => return result,
        };

        match api
            .update_pull_request(
                project,
                &repository.name,
                entry.pull_request_id,
                &PullRequestUpdate::complete(commit.as_str()),
            )
            .await
        {
            Ok(_) => {
                info!(repo = %entry.name, commit = %commit, "Completed pull request");
                ActionResult::Success {
                    repository: entry.name.clone(),
                    detail: format!("completed pull request {}", entry.pull_request_id),
                    url: Some(entry.pr_url.clone()),
                }
            }
            Err(e) => {
                warn!(repo = %entry.name, error = %e, "Failed to complete pull request");
                ActionResult::Failed {
                    repository: entry.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    })
    .instrument(span)
    .await
}
