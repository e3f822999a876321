use async_trait::async_trait;

use crate::error::Result;
use crate::platform::http::HttpJsonClient;
use crate::platform::reference::RepositoryReference;
use crate::platform::types::CreatePullRequest;
use crate::platform::Platform;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub REST client authenticated with a personal or installation token.
pub struct GitHubPlatform {
    http: HttpJsonClient,
    token: String,
    /// Overrides the API root derived from the repository host.
    api_url: Option<String>,
}

impl GitHubPlatform {
    pub fn new(http: HttpJsonClient, token: &str, api_url: Option<String>) -> Self {
        Self {
            http,
            token: token.to_string(),
            api_url: api_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    fn pulls_url(&self, repo: &RepositoryReference) -> String {
        let base = self
            .api_url
            .clone()
            .unwrap_or_else(|| repo.api_base_url());
        format!("{base}/repos/{}/{}/pulls", repo.owner, repo.name)
    }
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for GitHubPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubPlatform")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn create_pull_request(
        &self,
        repo: &RepositoryReference,
        pr: &CreatePullRequest,
    ) -> Result<serde_json::Value> {
        let url = self.pulls_url(repo);
        tracing::info!(
            repo = %repo.full_name(),
            head = %pr.head,
            base = %pr.base,
            "Creating pull request"
        );

        let created = self
            .http
            .post_json(
                &url,
                pr,
                &[
                    ("Accept", GITHUB_ACCEPT.to_string()),
                    ("Authorization", format!("token {}", self.token)),
                ],
            )
            .await?;

        tracing::info!(
            number = created["number"].as_u64().unwrap_or(0),
            url = created["html_url"].as_str().unwrap_or(""),
            "Pull request created"
        );

        Ok(created)
    }
}
