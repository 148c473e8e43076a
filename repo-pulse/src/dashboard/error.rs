//! Dashboard error types.

/// Errors that abort a dashboard operation as a whole.
///
/// Per-repository failures are never reported here; they surface as
/// [`crate::summary::ActionResult::Failed`] or are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Configuration loading and validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// API client initialization errors.
    #[error(transparent)]
    Api(#[from] crate::devops::ApiError),

    /// Neither the environment nor the configuration provides a token.
    #[error("No personal access token configured; set {} or azureDevOps.personalAccessToken", crate::config::TOKEN_ENV)]
    MissingToken,

    /// Another refresh has not finished yet.
    #[error("A refresh is already in progress")]
    RefreshInProgress,

    /// No aggregated pull request carries the requested title.
    #[error("No aggregated pull request titled '{title}'")]
    PullRequestNotFound { title: String },

    /// The requested repository is not in the configuration.
    #[error("Repository '{name}' is not configured")]
    RepositoryNotFound { name: String },
}
