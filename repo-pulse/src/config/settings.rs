//! Configuration document types.

use crate::config::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use url::Url;

/// Root of the RepoPulse configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Connection settings for the hosting platform.
    pub azure_dev_ops: AzureDevOpsSettings,

    /// Monitored repositories, in display and processing order.
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    /// Dependency-update bot detection.
    #[serde(default)]
    pub renovate: RenovateSettings,

    /// Formats for update-from-default-branch pull requests.
    #[serde(default)]
    pub update_pull_requests: UpdatePullRequestSettings,
}

/// Connection settings for an Azure DevOps organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureDevOpsSettings {
    /// Service root, e.g. `https://dev.azure.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Organization name.
    pub organization: String,

    /// Default project for repositories that do not name their own.
    #[serde(default)]
    pub project: Option<String>,

    /// Personal access token used for basic authentication.
    #[serde(default)]
    pub personal_access_token: String,
}

/// Static description of one monitored repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Repository name as known to the Git API.
    pub name: String,

    /// Project owning the repository; falls back to the organization default.
    #[serde(default)]
    pub project: Option<String>,

    /// Web link, absolute or relative to the base URL.
    #[serde(default)]
    pub url: String,

    /// Build definition id of the CI pipeline.
    #[serde(deserialize_with = "string_or_number")]
    pub pipeline_id: String,

    /// Default branch the pipeline builds, without the `refs/heads/` prefix.
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// Dependency-update bot detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovateSettings {
    /// Whether Renovate pull requests are aggregated at all.
    #[serde(default)]
    pub enabled: bool,

    /// Token matched case-insensitively against pull request authors.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    /// Auto-merge preference as set in Renovate. Stored and shown only;
    /// completion always goes through the `complete` action.
    #[serde(default)]
    pub auto_merge: bool,
}

/// Handlebars formats for update-from-default-branch pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePullRequestSettings {
    /// Title format.
    #[serde(default = "default_update_title_format")]
    pub title_format: String,

    /// Description format.
    #[serde(default = "default_update_description_format")]
    pub description_format: String,

    /// Whether the pull requests are created as drafts.
    #[serde(default)]
    pub draft: bool,
}

impl Default for RenovateSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_name: default_bot_name(),
            auto_merge: false,
        }
    }
}

impl Default for UpdatePullRequestSettings {
    fn default() -> Self {
        Self {
            title_format: default_update_title_format(),
            description_format: default_update_description_format(),
            draft: false,
        }
    }
}

pub fn default_base_url() -> String {
    "https://dev.azure.com".to_string()
}

pub fn default_branch() -> String {
    "main".to_string()
}

pub fn default_bot_name() -> String {
    "renovate".to_string()
}

pub fn default_update_title_format() -> String {
    "Update {{target_branch}} from {{source_branch}}".to_string()
}

pub fn default_update_description_format() -> String {
    "Brings `{{target_branch}}` of {{repository}} up to date with `{{source_branch}}`.".to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

impl Configuration {
    /// Parses and validates a configuration document.
    ///
    /// `origin` is only used to label errors (a file path or `"<import>"`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::JsonError`] for malformed JSON and
    /// [`ConfigError::ValidationError`] for documents that parse but are unusable.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::JsonError {
            path: origin.to_string(),
            source: e,
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::JsonError`] if serialization fails.
    pub fn to_json(&self, origin: &str) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::JsonError {
            path: origin.to_string(),
            source: e,
        })
    }

    /// Checks the document for values the API calls cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self, origin: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: origin.to_string(),
            message,
        };

        match Url::parse(&self.azure_dev_ops.base_url) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => {
                return Err(invalid(format!(
                    "baseUrl is not a valid URL: {}",
                    self.azure_dev_ops.base_url
                )))
            }
        }

        if self.azure_dev_ops.organization.trim().is_empty() {
            return Err(invalid("organization must not be empty".to_string()));
        }

        let mut names = HashSet::new();
        for repository in &self.repositories {
            if repository.name.trim().is_empty() {
                return Err(invalid("repository name must not be empty".to_string()));
            }
            if !names.insert(repository.name.as_str()) {
                return Err(invalid(format!(
                    "repository '{}' is configured more than once",
                    repository.name
                )));
            }
            if self.project_for(repository).is_none() {
                return Err(invalid(format!(
                    "repository '{}' has no project and no default project is set",
                    repository.name
                )));
            }
            if repository.pipeline_id.trim().is_empty() {
                return Err(invalid(format!(
                    "repository '{}' has an empty pipelineId",
                    repository.name
                )));
            }
        }

        if self.renovate.enabled && self.renovate.bot_name.trim().is_empty() {
            return Err(invalid(
                "botName must not be empty while renovate is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the project a repository lives in.
    #[must_use]
    pub fn project_for<'a>(&'a self, repository: &'a RepositoryConfig) -> Option<&'a str> {
        repository
            .project
            .as_deref()
            .or(self.azure_dev_ops.project.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    /// Looks up a repository by name.
    #[must_use]
    pub fn repository(&self, name: &str) -> Option<&RepositoryConfig> {
        self.repositories.iter().find(|r| r.name == name)
    }

    /// Resolves the web link of a repository.
    ///
    /// Absolute URLs are returned as-is, relative ones are appended to the base URL.
    #[must_use]
    pub fn web_url(&self, repository: &RepositoryConfig) -> String {
        if repository.url.starts_with("http://") || repository.url.starts_with("https://") {
            return repository.url.clone();
        }
        if repository.url.is_empty() {
            return format!(
                "{}/{}/{}/_git/{}",
                self.azure_dev_ops.base_url.trim_end_matches('/'),
                self.azure_dev_ops.organization,
                self.project_for(repository).unwrap_or_default(),
                repository.name
            );
        }
        format!(
            "{}{}",
            self.azure_dev_ops.base_url.trim_end_matches('/'),
            repository.url
        )
    }
}
