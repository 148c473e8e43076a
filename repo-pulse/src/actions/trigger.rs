//! Queuing pipeline runs.

use crate::actions::{for_each_repository, locate};
use crate::config::Configuration;
use crate::devops::{branch_ref, DevOpsApi};
use crate::summary::ActionResult;
use tracing::{info, info_span, warn, Instrument};

/// Queues a pipeline run on each repository's configured branch.
///
/// With `only`, just the repository of that name is triggered.
pub async fn trigger_pipelines(
    api: &dyn DevOpsApi,
    config: &Configuration,
    only: Option<&str>,
    concurrency: usize,
) -> Vec<ActionResult> {
    let span = info_span!("trigger", only = only.unwrap_or("all"));

    let repositories = config
        .repositories
        .iter()
        .filter(|repository| only.map_or(true, |name| repository.name == name));

    for_each_repository(repositories, concurrency, |repository| async move {
        let project = match locate(config, &repository.name) {
            Ok((_, project)) => project,
            Err(result) => return result,
        };
        let source_branch = branch_ref(&repository.branch);

        match api
            .queue_build(project, &repository.pipeline_id, &source_branch)
            .await
        {
            Ok(build) => {
                info!(
                    repo = %repository.name,
                    build_id = build.id,
                    branch = %source_branch,
                    "Pipeline triggered"
                );
                ActionResult::Success {
                    repository: repository.name.clone(),
                    detail: format!("queued build {} on {}", build.id, repository.branch),
                    url: build.web_url().map(str::to_string),
                }
            }
            Err(e) => {
                warn!(repo = %repository.name, error = %e, "Failed to trigger pipeline");
                ActionResult::Failed {
                    repository: repository.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    })
    .instrument(span)
    .await
}
