pub mod github;
pub mod http;
pub mod reference;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use reference::RepositoryReference;
use types::CreatePullRequest;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Open a pull request and return the created resource as returned by the API.
    async fn create_pull_request(
        &self,
        repo: &RepositoryReference,
        pr: &CreatePullRequest,
    ) -> Result<serde_json::Value>;
}
