use std::path::Path;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::workspace::process;

/// Validate a branch name or ref to prevent argument injection.
/// Rejects names starting with `-` as defence in depth.
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::Workspace("Empty branch or ref name".to_string()));
    }
    if name.starts_with('-') {
        return Err(AppError::Workspace(format!(
            "Invalid branch or ref name (starts with '-'): {name}"
        )));
    }
    Ok(())
}

/// The version-control operations the workflow needs.
///
/// Every method runs against the working copy at `dir` (except `clone_shallow`,
/// which creates it) and fails with [`AppError::Process`] on a non-zero exit.
#[async_trait]
pub trait Git: Send + Sync {
    /// Clone `url` into `target` with depth 1 and no tags.
    async fn clone_shallow(&self, url: &str, target: &Path) -> Result<()>;

    /// Point `origin` at `url`.
    async fn set_remote_url(&self, dir: &Path, url: &str) -> Result<()>;

    /// Target of the clone's local `refs/remotes/origin/HEAD`, e.g. `origin/main`.
    async fn origin_head(&self, dir: &Path) -> Result<String>;

    /// Raw remote metadata (`git remote show origin`).
    async fn remote_info(&self, dir: &Path) -> Result<String>;

    /// Fetch exactly `reference` from `url` with depth 1 into `FETCH_HEAD`.
    /// `url` is passed on the command line and never stored in the config.
    async fn fetch_ref(&self, dir: &Path, url: &str, reference: &str) -> Result<()>;

    /// Check out an existing branch, commit or `FETCH_HEAD`.
    async fn checkout(&self, dir: &Path, rev: &str) -> Result<()>;

    /// Create `name` from the current checkout and switch to it.
    async fn create_branch(&self, dir: &Path, name: &str) -> Result<()>;

    /// Porcelain status, one line per changed path.
    async fn status_porcelain(&self, dir: &Path) -> Result<String>;

    /// Set the committer identity for this working copy only.
    async fn configure_identity(&self, dir: &Path, name: &str, email: &str) -> Result<()>;

    /// Stage every change, including deletions and untracked files.
    async fn add_all(&self, dir: &Path) -> Result<()>;

    async fn commit(&self, dir: &Path, message: &str) -> Result<()>;

    /// Push `branch` to `origin` and set it as upstream.
    async fn push_upstream(&self, dir: &Path, branch: &str) -> Result<()>;
}

/// Environment for every git invocation: never prompt for credentials and
/// keep output untranslated so it can be parsed.
const GIT_ENV: &[(&str, &str)] = &[("GIT_TERMINAL_PROMPT", "0"), ("LC_ALL", "C")];

/// [`Git`] backed by the `git` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    async fn git(&self, dir: Option<&Path>, args: &[&str]) -> Result<process::ProcessOutput> {
        process::run_with_env(&self.program, args, dir, GIT_ENV).await
    }
}

#[async_trait]
impl Git for GitCli {
    async fn clone_shallow(&self, url: &str, target: &Path) -> Result<()> {
        if !url.starts_with("https://") {
            return Err(AppError::Workspace(format!(
                "Expected HTTPS clone URL, got: {url}"
            )));
        }
        let target = target.to_string_lossy().into_owned();
        self.git(
            None,
            &["clone", "--depth", "1", "--no-tags", url, target.as_str()],
        )
        .await?;
        Ok(())
    }

    async fn set_remote_url(&self, dir: &Path, url: &str) -> Result<()> {
        self.git(Some(dir), &["remote", "set-url", "origin", url]).await?;
        Ok(())
    }

    async fn origin_head(&self, dir: &Path) -> Result<String> {
        let out = self
            .git(
                Some(dir),
                &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"],
            )
            .await?;
        Ok(out.stdout.trim().to_string())
    }

    async fn remote_info(&self, dir: &Path) -> Result<String> {
        let out = self.git(Some(dir), &["remote", "show", "origin"]).await?;
        Ok(out.stdout)
    }

    async fn fetch_ref(&self, dir: &Path, url: &str, reference: &str) -> Result<()> {
        validate_ref_name(reference)?;
        self.git(
            Some(dir),
            &["fetch", "--depth", "1", "--no-tags", url, reference],
        )
        .await?;
        Ok(())
    }

    async fn checkout(&self, dir: &Path, rev: &str) -> Result<()> {
        validate_ref_name(rev)?;
        self.git(Some(dir), &["checkout", rev]).await?;
        Ok(())
    }

    async fn create_branch(&self, dir: &Path, name: &str) -> Result<()> {
        validate_ref_name(name)?;
        self.git(Some(dir), &["checkout", "-b", name]).await?;
        Ok(())
    }

    async fn status_porcelain(&self, dir: &Path) -> Result<String> {
        let out = self.git(Some(dir), &["status", "--porcelain"]).await?;
        Ok(out.stdout)
    }

    async fn configure_identity(&self, dir: &Path, name: &str, email: &str) -> Result<()> {
        self.git(Some(dir), &["config", "user.name", name]).await?;
        self.git(Some(dir), &["config", "user.email", email]).await?;
        Ok(())
    }

    async fn add_all(&self, dir: &Path) -> Result<()> {
        self.git(Some(dir), &["add", "-A"]).await?;
        Ok(())
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.git(Some(dir), &["commit", "-m", message]).await?;
        Ok(())
    }

    async fn push_upstream(&self, dir: &Path, branch: &str) -> Result<()> {
        validate_ref_name(branch)?;
        self.git(Some(dir), &["push", "-u", "origin", branch]).await?;
        Ok(())
    }
}

/// Whether porcelain status output reports any modified path.
pub fn has_changes(status: &str) -> bool {
    status.lines().any(|line| !line.trim().is_empty())
}
