//! Pull requests that bring a branch up to date with the default branch.

use crate::actions::{for_each_repository, locate};
use crate::config::Configuration;
use crate::devops::{branch_ref, pull_request_web_url, DevOpsApi, NewPullRequest};
use crate::summary::ActionResult;
use crate::templates::{TemplateRenderer, UpdateContext};
use tracing::{info, info_span, warn, Instrument};

/// Opens a pull request from each repository's configured branch into
/// `target_branch`.
///
/// Title and description come from the `updatePullRequests` formats.
/// Repositories whose configured branch is the target are skipped.
pub async fn create_update_pull_requests(
    api: &dyn DevOpsApi,
    config: &Configuration,
    renderer: &TemplateRenderer,
    target_branch: &str,
    concurrency: usize,
) -> Vec<ActionResult> {
    let span = info_span!("update_prs", target = %target_branch);
    let target_ref = branch_ref(target_branch);

    for_each_repository(&config.repositories, concurrency, |repository| {
        let target_ref = target_ref.clone();
        async move {
            let source_ref = branch_ref(&repository.branch);
            if source_ref == target_ref {
                return ActionResult::Skipped {
                    repository: repository.name.clone(),
                    reason: "target is the configured branch".to_string(),
                };
            }

            let project = match locate(config, &repository.name) {
                Ok((_, project)) => project,
                Err(result) => return result,
            };

            let context = UpdateContext {
                repository: &repository.name,
                source_branch: &repository.branch,
                target_branch,
            };
            let formats = &config.update_pull_requests;
            let rendered = renderer
                .render_update(&formats.title_format, &context)
                .and_then(|title| {
                    renderer
                        .render_update(&formats.description_format, &context)
                        .map(|description| (title, description))
                });
            let (title, description) = match rendered {
                Ok(rendered) => rendered,
                Err(e) => {
                    return ActionResult::Failed {
                        repository: repository.name.clone(),
                        error: e.to_string(),
                    }
                }
            };

            let request = NewPullRequest {
                source_ref_name: source_ref,
                target_ref_name: target_ref,
                title,
                description,
                is_draft: formats.draft,
            };

            match api
                .create_pull_request(project, &repository.name, &request)
                .await
            {
                Ok(pr) => {
                    info!(
                        repo = %repository.name,
                        pull_request_id = pr.pull_request_id,
                        "Update pull request created"
                    );
                    ActionResult::Success {
                        repository: repository.name.clone(),
                        detail: format!("created pull request {}", pr.pull_request_id),
                        url: Some(pull_request_web_url(
                            &config.azure_dev_ops,
                            project,
                            &repository.name,
                            pr.pull_request_id,
                        )),
                    }
                }
                Err(e) => {
                    warn!(repo = %repository.name, error = %e, "Failed to create update pull request");
                    ActionResult::Failed {
                        repository: repository.name.clone(),
                        error: e.to_string(),
                    }
                }
            }
        }
    })
    .instrument(span)
    .await
}
