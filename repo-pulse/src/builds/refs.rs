//! Candidate refs under which a pull request's build may have run.

use crate::devops::branch_ref;

/// Refs to search for a pull request build, most specific first.
///
/// The merge ref is what PR validation builds run against, then the source
/// branch, then the repository's default branch. The default branch comes
/// last because a build found there may belong to an unrelated change.
#[must_use]
pub fn candidate_refs(pull_request_id: u64, source_ref: &str, default_branch: &str) -> Vec<String> {
    let mut refs = vec![format!("refs/pull/{pull_request_id}/merge")];

    if !source_ref.trim().is_empty() {
        refs.push(branch_ref(source_ref));
    }
    refs.push(branch_ref(default_branch));

    refs.dedup();
    refs
}
