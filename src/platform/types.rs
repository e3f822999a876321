use serde::Serialize;

/// Body of `POST /repos/{owner}/{name}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}
