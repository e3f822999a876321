use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::workflow::types::{
    DEFAULT_AUTHOR_EMAIL, DEFAULT_AUTHOR_NAME, DEFAULT_BRANCH_PREFIX,
};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// REST API root. Derived from the repository host when unset.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: None,
            user_agent: default_user_agent(),
        }
    }
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowSettings {
    #[serde(default)]
    pub base_branch: Option<String>,
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,
    #[serde(default = "default_cleanup")]
    pub cleanup: bool,
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,
    #[serde(default)]
    pub switch_working_dir: bool,
    #[serde(default = "default_author_name")]
    pub commit_author_name: String,
    #[serde(default = "default_author_email")]
    pub commit_author_email: String,
    #[serde(default)]
    pub commit_message: Option<String>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            base_branch: None,
            branch_prefix: default_branch_prefix(),
            cleanup: default_cleanup(),
            workspace_dir: None,
            switch_working_dir: false,
            commit_author_name: default_author_name(),
            commit_author_email: default_author_email(),
            commit_message: None,
        }
    }
}

#[derive(Deserialize, Clone, Default)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: Option<String>,
    /// HMAC-SHA256 key for the `X-Hub-Signature-256` header.
    #[serde(default)]
    pub secret: Option<String>,
}

// Manual Debug impl to avoid leaking the signing secret
impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn default_user_agent() -> String {
    format!("mini-agent-action/{}", env!("CARGO_PKG_VERSION"))
}

fn default_branch_prefix() -> String {
    DEFAULT_BRANCH_PREFIX.to_string()
}

fn default_cleanup() -> bool {
    true
}

fn default_author_name() -> String {
    DEFAULT_AUTHOR_NAME.to_string()
}

fn default_author_email() -> String {
    DEFAULT_AUTHOR_EMAIL.to_string()
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(
                config::File::with_name("mini-agent-action").required(false),
            );
        }

        // Environment variable overrides with MINI_AGENT_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("MINI_AGENT")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
