//! Manual actions run against each repository of an aggregate or of the
//! configuration.
//!
//! Every action reports one [`ActionResult`] per repository. A failure in one
//! repository never stops the others and nothing is rolled back.

mod complete;
mod publish;
mod trigger;
mod update_pr;

pub use complete::complete_pull_request;
pub use publish::publish_pull_request;
pub use trigger::trigger_pipelines;
pub use update_pr::create_update_pull_requests;

use crate::config::{Configuration, RepositoryConfig};
use crate::summary::ActionResult;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Runs `action` for each item with at most `concurrency` in flight,
/// keeping input order.
async fn for_each_repository<I, F, Fut>(items: I, concurrency: usize, action: F) -> Vec<ActionResult>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = ActionResult>,
{
    stream::iter(items)
        .map(action)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Finds a repository and its project, or the failure to report for it.
fn locate<'a>(
    config: &'a Configuration,
    name: &str,
) -> Result<(&'a RepositoryConfig, &'a str), ActionResult> {
    let failed = |error: &str| ActionResult::Failed {
        repository: name.to_string(),
        error: error.to_string(),
    };
    let repository = config
        .repository(name)
        .ok_or_else(|| failed("repository is not configured"))?;
    let project = config
        .project_for(repository)
        .ok_or_else(|| failed("repository has no project"))?;
    Ok((repository, project))
}
