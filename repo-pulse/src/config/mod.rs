//! Configuration loading, validation and persistence.
//!
//! The configuration is a single JSON document describing the Azure DevOps
//! organization, the monitored repositories and the Renovate bot settings.

mod error;
mod sample;
mod settings;
mod store;

pub use error::ConfigError;
pub use sample::sample_configuration;
pub use settings::{
    default_base_url, default_bot_name, default_branch, default_update_description_format,
    default_update_title_format, AzureDevOpsSettings, Configuration, RenovateSettings,
    RepositoryConfig, UpdatePullRequestSettings,
};
pub use store::{
    import_configuration, require_configuration, ConfigurationStore, FileConfigurationStore,
    MemoryConfigurationStore,
};

/// Environment variable that overrides the stored personal access token.
pub const TOKEN_ENV: &str = "AZURE_DEVOPS_PAT";

/// Resolves the personal access token to use for API calls.
///
/// Environment variable takes precedence over the configuration file.
/// Returns `None` when neither provides a non-empty token.
#[must_use]
pub fn resolve_token(settings: &AzureDevOpsSettings) -> Option<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            return Some(token);
        }
    }
    Some(settings.personal_access_token.clone()).filter(|t| !t.trim().is_empty())
}
