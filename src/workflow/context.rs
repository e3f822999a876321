use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::platform::reference::RepositoryReference;
use crate::platform::types::CreatePullRequest;
use crate::platform::Platform;
use crate::webhook::notifier::WebhookNotifier;
use crate::workflow::types::{
    OutcomePayload, PrResult, RunReport, RunStatus, SkipReason, WorkflowConfig,
};
use crate::workspace::branch::{generate_branch_name, resolve_default_branch};
use crate::workspace::git::{has_changes, Git};
use crate::workspace::manager::{CurrentDirGuard, Workspace};

/// Owns one "clone, let the caller change files, land the changes" run.
///
/// Only one run may be active per process when `switch_working_dir` is set,
/// since the working directory is process-wide.
pub struct WorkflowContext {
    config: WorkflowConfig,
    git: Arc<dyn Git>,
    platform: Arc<dyn Platform>,
    notifier: WebhookNotifier,
}

/// State accumulated by the entry protocol and consumed by the exit protocol.
struct Session {
    repo: RepositoryReference,
    workspace: Workspace,
    branch: Option<String>,
    cwd: Option<CurrentDirGuard>,
}

impl WorkflowContext {
    pub fn new(
        config: WorkflowConfig,
        git: Arc<dyn Git>,
        platform: Arc<dyn Platform>,
        notifier: WebhookNotifier,
    ) -> Self {
        Self {
            config,
            git,
            platform,
            notifier,
        }
    }

    /// Prepare a fresh checkout, run `work` against it, then commit, push and
    /// open a pull request for whatever `work` changed.
    ///
    /// `work` receives the checkout path. Errors from setup or from `work` are
    /// returned unchanged, but only after the webhook was notified and the
    /// workspace removed. Errors while landing the changes are reported in the
    /// returned outcome instead.
    ///
    /// If `work` panics the unwind still removes the workspace and restores the
    /// working directory, but no webhook is sent.
    pub async fn run<F, Fut, T>(&self, work: F) -> Result<RunReport<T>>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.config.token.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }
        let repo = RepositoryReference::parse(&self.config.repository, &self.config.token)?;
        let workspace = match Workspace::acquire(
            self.config.workspace_dir.as_deref(),
            &repo.full_name(),
            self.config.cleanup,
        ) {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire workspace");
                self.notifier
                    .notify(&OutcomePayload {
                        status: RunStatus::Failure,
                        repo: repo.full_name(),
                        branch: None,
                        pr: None,
                        error: Some(e.to_string()),
                    })
                    .await;
                return Err(e);
            }
        };

        tracing::info!(
            repo = %repo.full_name(),
            workspace = %workspace.root().display(),
            "Workspace acquired"
        );

        let mut session = Session {
            repo,
            workspace,
            branch: None,
            cwd: None,
        };

        let result = match self.setup(&mut session).await {
            Ok(()) => {
                let checkout = session.workspace.checkout_path().to_path_buf();
                work(checkout).await
            }
            Err(e) => {
                tracing::error!(error = %e, "Workspace setup failed");
                Err(e)
            }
        };

        self.finish(session, result).await
    }

    /// Entry protocol: clone, hide the credential, check out the starting
    /// point and create the working branch. Stops at the first failure.
    async fn setup(&self, session: &mut Session) -> Result<()> {
        let git = self.git.as_ref();
        let dir = session.workspace.checkout_path().to_path_buf();
        let repo = &session.repo;

        git.clone_shallow(repo.credentialed_url(), &dir).await?;
        git.set_remote_url(&dir, &repo.plain_url).await?;
        tracing::debug!(repo = %repo.full_name(), "Cloned");

        let default_branch =
            resolve_default_branch(git, &dir, self.config.fallback_base_branch()).await;

        match &self.config.start_ref {
            Some(start) => {
                // The plain remote may be private; fetch straight from the credentialed URL
                git.fetch_ref(&dir, repo.credentialed_url(), start).await?;
                git.checkout(&dir, "FETCH_HEAD").await?;
                tracing::debug!(start_ref = %start, "Checked out starting ref");
            }
            None => {
                git.checkout(&dir, &default_branch).await?;
                tracing::debug!(branch = %default_branch, "Checked out default branch");
            }
        }

        let branch = match &self.config.branch_name {
            Some(name) => name.clone(),
            None => generate_branch_name(&self.config.branch_prefix, chrono::Utc::now()),
        };
        git.create_branch(&dir, &branch).await?;
        tracing::info!(branch = %branch, "Working branch created");
        session.branch = Some(branch);

        if self.config.switch_working_dir {
            session.cwd = Some(CurrentDirGuard::enter(&dir)?);
        }

        Ok(())
    }

    /// Exit protocol: restore the working directory, land changes if the run
    /// succeeded, notify, clean up, then hand back the original error if any.
    async fn finish<T>(&self, mut session: Session, result: Result<T>) -> Result<RunReport<T>> {
        if let Some(cwd) = session.cwd.take() {
            cwd.restore();
        }

        let mut outcome = OutcomePayload {
            status: RunStatus::Success,
            repo: session.repo.full_name(),
            branch: session.branch.clone(),
            pr: None,
            error: None,
        };

        match &result {
            Ok(_) => {
                // Setup always materializes the branch before the caller's work runs
                if let Some(branch) = &session.branch {
                    let dir = session.workspace.checkout_path();
                    match self.land_changes(&session.repo, dir, branch).await {
                        Ok(pr) => outcome.pr = Some(pr),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to land changes");
                            outcome.status = RunStatus::Failure;
                            outcome.error = Some(e.to_string());
                        }
                    }
                }
            }
            Err(e) => {
                outcome.status = RunStatus::Failure;
                outcome.error = Some(e.to_string());
            }
        }

        self.notifier.notify(&outcome).await;

        session.workspace.release();

        tracing::info!(
            repo = %outcome.repo,
            status = ?outcome.status,
            "Workflow finished"
        );

        let value = result?;
        Ok(RunReport { value, outcome })
    }

    /// Commit, push and open a pull request, or skip when nothing changed.
    async fn land_changes(
        &self,
        repo: &RepositoryReference,
        dir: &Path,
        branch: &str,
    ) -> Result<PrResult> {
        let git = self.git.as_ref();

        let status = git.status_porcelain(dir).await?;
        if !has_changes(&status) {
            tracing::info!("No changes to commit");
            return Ok(PrResult::skipped(SkipReason::NoChanges));
        }

        git.configure_identity(dir, &self.config.author_name, &self.config.author_email)
            .await?;
        git.add_all(dir).await?;
        git.commit(dir, self.config.commit_message()).await?;

        // The credentialed URL is configured only for the duration of the push
        git.set_remote_url(dir, repo.credentialed_url()).await?;
        let pushed = git.push_upstream(dir, branch).await;
        let restored = git.set_remote_url(dir, &repo.plain_url).await;
        if let Err(e) = &restored {
            tracing::error!(
                error = %e,
                path = %dir.display(),
                "Failed to reset remote URL; the access token is still in .git/config"
            );
        }
        pushed?;
        restored.map_err(|e| {
            AppError::Workspace(format!(
                "Failed to reset remote URL after push, access token left in {}: {e}",
                dir.join(".git").join("config").display()
            ))
        })?;
        tracing::info!(branch = %branch, "Pushed working branch");

        let base = match &self.config.base_branch {
            Some(base) => base.clone(),
            None => resolve_default_branch(git, dir, self.config.fallback_base_branch()).await,
        };

        let created = self
            .platform
            .create_pull_request(
                repo,
                &CreatePullRequest {
                    title: self.config.pr_title().to_string(),
                    head: branch.to_string(),
                    base,
                    body: self.config.pr_body().to_string(),
                },
            )
            .await?;

        Ok(PrResult::Created(created))
    }
}
