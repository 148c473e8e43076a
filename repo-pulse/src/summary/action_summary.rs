//! Action summary types.

use super::result::ActionResult;
use serde::Serialize;

/// Summary of one action across repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    /// Number of repositories where the action succeeded.
    pub succeeded: usize,

    /// Number of repositories that needed nothing.
    pub skipped: usize,

    /// Number of repositories where the action failed.
    pub failed: usize,
}

impl ActionSummary {
    /// Builds a summary from a set of results.
    #[must_use]
    pub fn from_results(results: &[ActionResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record_result(result);
        }
        summary
    }

    /// Updates the summary with a result.
    pub fn record_result(&mut self, result: &ActionResult) {
        match result {
            ActionResult::Success { .. } => self.succeeded += 1,
            ActionResult::Skipped { .. } => self.skipped += 1,
            ActionResult::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
