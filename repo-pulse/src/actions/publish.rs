//! Publishing draft pull requests.

use crate::actions::{for_each_repository, locate};
use crate::aggregation::{AggregatePullRequest, PullRequestStatus};
use crate::config::Configuration;
use crate::devops::{DevOpsApi, PullRequestUpdate};
use crate::summary::ActionResult;
use tracing::{info, info_span, warn, Instrument};

/// Flips every draft pull request of an aggregate to active.
///
/// Entries that are already active are skipped.
pub async fn publish_pull_request(
    api: &dyn DevOpsApi,
    config: &Configuration,
    aggregate: &AggregatePullRequest,
    concurrency: usize,
) -> Vec<ActionResult> {
    let span = info_span!("publish", title = %aggregate.title);

    for_each_repository(&aggregate.repositories, concurrency, |entry| async move {
        if entry.status == PullRequestStatus::Active {
            return ActionResult::Skipped {
                repository: entry.name.clone(),
                reason: "already published".to_string(),
            };
        }

        let (repository, project) = match locate(config, &entry.name) {
            Ok(found) => found,
            Err(result) => return result,
        };

        match api
            .update_pull_request(
                project,
                &repository.name,
                entry.pull_request_id,
                &PullRequestUpdate::publish(),
            )
            .await
        {
            Ok(_) => {
                info!(repo = %entry.name, pull_request_id = entry.pull_request_id, "Published pull request");
                ActionResult::Success {
                    repository: entry.name.clone(),
                    detail: format!("published pull request {}", entry.pull_request_id),
                    url: Some(entry.pr_url.clone()),
                }
            }
            Err(e) => {
                warn!(repo = %entry.name, error = %e, "Failed to publish pull request");
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
