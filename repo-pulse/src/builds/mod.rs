//! Build status resolution.
//!
//! Attaches the most relevant pipeline run to each repository entry of an
//! aggregate, and reports the latest run of each repository's pipeline.

mod outcome;
mod refs;
mod repository_status;
mod status;

pub use outcome::BuildOutcome;
pub use refs::candidate_refs;
pub use repository_status::RepositoryStatus;
pub use status::BuildStatus;

use crate::aggregation::AggregatePullRequest;
use crate::config::Configuration;
use crate::devops::{branch_ref, ApiError, DevOpsApi};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

/// One build lookup for one repository entry.
struct Lookup {
    aggregate: usize,
    entry: usize,
    repository: String,
    project: String,
    pipeline_id: String,
    refs: Vec<String>,
}

/// Fills `build_status` on every repository entry.
///
/// Each entry's candidate refs are tried in order and the first run found
/// wins. Entries without a run, and entries whose lookup failed, keep
/// `build_status: None`. Returns the repositories whose lookup failed, each
/// named once.
pub async fn resolve_build_statuses(
    api: &dyn DevOpsApi,
    config: &Configuration,
    aggregates: &mut [AggregatePullRequest],
    concurrency: usize,
) -> Vec<String> {
    let span = info_span!("resolve_builds", aggregates = aggregates.len());

    async {
        let mut lookups = Vec::new();
        for (aggregate_index, aggregate) in aggregates.iter().enumerate() {
            for (entry_index, entry) in aggregate.repositories.iter().enumerate() {
                let Some(repository) = config.repository(&entry.name) else {
                    warn!(repo = %entry.name, "Repository no longer configured, skipping build lookup");
                    continue;
                };
                let Some(project) = config.project_for(repository) else {
                    continue;
                };
                lookups.push(Lookup {
                    aggregate: aggregate_index,
                    entry: entry_index,
                    repository: entry.name.clone(),
                    project: project.to_string(),
                    pipeline_id: repository.pipeline_id.clone(),
                    refs: candidate_refs(entry.pull_request_id, &entry.branch, &repository.branch),
                });
            }
        }

        info!(lookups = lookups.len(), "Resolving build statuses");

        let results: Vec<(Lookup, Result<Option<BuildStatus>, ApiError>)> = stream::iter(lookups)
            .map(|lookup| async move {
                let status = find_build(
                    api,
                    &lookup.repository,
                    &lookup.project,
                    &lookup.pipeline_id,
                    &lookup.refs,
                )
                .await;
                (lookup, status)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let mut failed: Vec<String> = Vec::new();
        for (lookup, status) in results {
            match status {
                Ok(status) => {
                    aggregates[lookup.aggregate].repositories[lookup.entry].build_status = status;
                }
                Err(_) => {
                    if !failed.contains(&lookup.repository) {
                        failed.push(lookup.repository);
                    }
                }
            }
        }
        failed
    }
    .instrument(span)
    .await
}

/// Returns the first run found under `refs`, in order.
///
/// Stops at the first failed query.
async fn find_build(
    api: &dyn DevOpsApi,
    repository: &str,
    project: &str,
    pipeline_id: &str,
    refs: &[String],
) -> Result<Option<BuildStatus>, ApiError> {
    for candidate in refs {
        match api.latest_build(project, pipeline_id, candidate).await {
            Ok(Some(build)) => {
                debug!(repo = %repository, git_ref = %candidate, build_id = build.id, "Found build");
                return Ok(Some(BuildStatus::from_build(&build, candidate)));
            }
            Ok(None) => {
                debug!(repo = %repository, git_ref = %candidate, "No build for ref");
            }
            Err(e) => {
                warn!(
                    repo = %repository,
                    git_ref = %candidate,
                    error = %e,
                    "Failed to query builds"
                );
                return Err(e);
            }
        }
    }
    Ok(None)
}

/// Reports the latest pipeline run of every configured repository on its
/// configured branch.
///
/// A failed lookup is carried in [`RepositoryStatus::error`] instead of
/// aborting the others.
pub async fn resolve_repository_statuses(
    api: &dyn DevOpsApi,
    config: &Configuration,
    concurrency: usize,
) -> Vec<RepositoryStatus> {
    let span = info_span!("repository_statuses", repositories = config.repositories.len());

    async {
        stream::iter(&config.repositories)
            .map(|repository| async move {
                let branch = branch_ref(&repository.branch);
                let lookup = match config.project_for(repository) {
                    Some(project) => find_build(
                        api,
                        &repository.name,
                        project,
                        &repository.pipeline_id,
                        std::slice::from_ref(&branch),
                    )
                    .await
                    .map_err(|e| e.to_string()),
                    None => Err("repository has no project".to_string()),
                };
                let (build, error) = match lookup {
                    Ok(build) => (build, None),
                    Err(error) => (None, Some(error)),
                };
                RepositoryStatus {
                    name: repository.name.clone(),
                    pipeline_id: repository.pipeline_id.clone(),
                    branch: repository.branch.clone(),
                    web_url: config.web_url(repository),
                    build,
                    error,
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
    .instrument(span)
    .await
}
