//! Sample configuration offered to new users.

use crate::config::{
    AzureDevOpsSettings, Configuration, RenovateSettings, RepositoryConfig,
    UpdatePullRequestSettings,
};

const SAMPLE_REPOSITORIES: [(&str, &str); 3] = [
    ("frontend-app", "123"),
    ("backend-api", "124"),
    ("shared-components", "125"),
];

/// Builds a configuration document with placeholder values.
#[must_use]
pub fn sample_configuration() -> Configuration {
    Configuration {
        azure_dev_ops: AzureDevOpsSettings {
            base_url: "https://dev.azure.com".to_string(),
            organization: "myorg".to_string(),
            project: Some("myproject".to_string()),
            personal_access_token: "your-personal-access-token".to_string(),
        },
        repositories: SAMPLE_REPOSITORIES
            .iter()
            .map(|(name, pipeline_id)| RepositoryConfig {
                name: (*name).to_string(),
                project: Some("myproject".to_string()),
                url: format!("https://dev.azure.com/myorg/myproject/_git/{name}"),
                pipeline_id: (*pipeline_id).to_string(),
                branch: "main".to_string(),
            })
            .collect(),
        renovate: RenovateSettings {
            enabled: true,
            bot_name: "renovate[bot]".to_string(),
            auto_merge: false,
        },
        update_pull_requests: UpdatePullRequestSettings::default(),
    }
}
