#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod actions;
pub mod aggregation;
pub mod builds;
pub mod config;
pub mod dashboard;
pub mod devops;
pub mod rate_limit;
pub mod summary;
pub mod templates;

pub use actions::{
    complete_pull_request, create_update_pull_requests, publish_pull_request, trigger_pipelines,
};
pub use aggregation::{
    aggregate_pull_requests, group_pull_requests, is_authored_by, AggregatePullRequest,
    Aggregation, PullRequestRepositoryEntry, PullRequestStatus,
};
pub use builds::{
    candidate_refs, resolve_build_statuses, resolve_repository_statuses, BuildOutcome,
    BuildStatus, RepositoryStatus,
};
pub use config::{
    import_configuration, require_configuration, resolve_token, sample_configuration,
    ConfigError, Configuration, ConfigurationStore, FileConfigurationStore,
    MemoryConfigurationStore, RepositoryConfig, TOKEN_ENV,
};
pub use dashboard::{Dashboard, DashboardError, DEFAULT_CONCURRENCY};
pub use devops::{ApiError, AzureDevOpsClient, DevOpsApi};
pub use rate_limit::{wait_for_retry_after, wait_if_needed, RateLimitInfo};
pub use summary::{ActionResult, ActionSummary};
pub use templates::{create_handlebars_registry, TemplateError, TemplateRenderer};
