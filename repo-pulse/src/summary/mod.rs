//! Per-repository action outcomes and their summary.

mod action_summary;
mod result;

pub use action_summary::ActionSummary;
pub use result::ActionResult;
