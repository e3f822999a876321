use std::path::PathBuf;

use serde::Serialize;

pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_BRANCH_PREFIX: &str = "mini-agent-action";
pub const DEFAULT_AUTHOR_NAME: &str = "mini-agent-action[bot]";
pub const DEFAULT_AUTHOR_EMAIL: &str = "mini-agent-action[bot]@users.noreply.github.com";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Automated changes by mini-agent-action";
pub const DEFAULT_PR_TITLE: &str = "Automated changes by mini-agent-action";
pub const DEFAULT_PR_BODY: &str =
    "This pull request was opened automatically by mini-agent-action.";

/// Parameters of one workflow run. Fixed at construction.
#[derive(Clone)]
pub struct WorkflowConfig {
    /// `owner/name` or a clone URL.
    pub repository: String,
    pub token: String,
    /// Commit or ref to start from instead of the default branch.
    pub start_ref: Option<String>,
    /// Pull request target. Resolved from the remote when `None`.
    pub base_branch: Option<String>,
    pub branch_prefix: String,
    pub branch_name: Option<String>,
    pub pr_title: Option<String>,
    pub pr_body: Option<String>,
    /// Commit message; falls back to the PR title, then a default.
    pub commit_message: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub cleanup: bool,
    /// Parent of the temporary workspace. System temp directory when `None`.
    pub workspace_dir: Option<PathBuf>,
    /// Also switch the process working directory into the checkout while
    /// the caller's work runs.
    pub switch_working_dir: bool,
}

impl WorkflowConfig {
    pub fn new(repository: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            token: token.into(),
            start_ref: None,
            base_branch: None,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            branch_name: None,
            pr_title: None,
            pr_body: None,
            commit_message: None,
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
            cleanup: true,
            workspace_dir: None,
            switch_working_dir: false,
        }
    }

    /// Branch used when the remote does not report a default branch.
    pub fn fallback_base_branch(&self) -> &str {
        self.base_branch.as_deref().unwrap_or(DEFAULT_BASE_BRANCH)
    }

    pub fn commit_message(&self) -> &str {
        self.commit_message
            .as_deref()
            .or(self.pr_title.as_deref())
            .unwrap_or(DEFAULT_COMMIT_MESSAGE)
    }

    pub fn pr_title(&self) -> &str {
        self.pr_title.as_deref().unwrap_or(DEFAULT_PR_TITLE)
    }

    pub fn pr_body(&self) -> &str {
        self.pr_body.as_deref().unwrap_or(DEFAULT_PR_BODY)
    }
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("repository", &self.repository)
            .field("token", &"[REDACTED]")
            .field("start_ref", &self.start_ref)
            .field("base_branch", &self.base_branch)
            .field("branch_prefix", &self.branch_prefix)
            .field("branch_name", &self.branch_name)
            .field("pr_title", &self.pr_title)
            .field("cleanup", &self.cleanup)
            .field("workspace_dir", &self.workspace_dir)
            .field("switch_working_dir", &self.switch_working_dir)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoChanges,
}

/// What happened to the pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrResult {
    /// The resource returned by the pull-request API.
    Created(serde_json::Value),
    Skipped { skipped: bool, reason: SkipReason },
}

impl PrResult {
    pub fn skipped(reason: SkipReason) -> Self {
        PrResult::Skipped {
            skipped: true,
            reason,
        }
    }
}

/// Final result of a run, as delivered to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomePayload {
    pub status: RunStatus,
    /// `owner/name`.
    pub repo: String,
    pub branch: Option<String>,
    pub pr: Option<PrResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomePayload {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// The caller's value together with the outcome of landing its changes.
#[derive(Debug)]
pub struct RunReport<T> {
    pub value: T,
    pub outcome: OutcomePayload,
}
