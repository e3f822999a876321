use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{AppError, Result};

/// An exclusively-owned temporary directory holding one working copy.
///
/// Dropping the workspace removes the directory unless cleanup was disabled.
pub struct Workspace {
    /// `None` once cleanup is disabled or the directory was released.
    guard: Option<TempDir>,
    root: PathBuf,
    checkout: PathBuf,
}

impl Workspace {
    /// Create a fresh, uniquely named temporary directory for `repo_name`,
    /// under `base_dir` or the system temporary directory.
    pub fn acquire(base_dir: Option<&Path>, repo_name: &str, cleanup: bool) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mini-agent-action-");
        let root = match base_dir {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }
        .map_err(|e| AppError::Workspace(format!("Failed to create workspace: {e}")))?;
        let checkout = root.path().join(sanitize(repo_name));

        let (guard, root) = if cleanup {
            let path = root.path().to_path_buf();
            (Some(root), path)
        } else {
            (None, root.keep())
        };

        Ok(Self {
            guard,
            root,
            checkout,
        })
    }

    /// Temporary directory that contains the working copy.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the working copy itself.
    pub fn checkout_path(&self) -> &Path {
        &self.checkout
    }

    /// Delete the directory tree now, ignoring errors. A no-op when cleanup
    /// is disabled.
    pub fn release(mut self) {
        match self.guard.take() {
            Some(guard) => {
                if let Err(e) = guard.close() {
                    tracing::debug!(
                        path = %self.root.display(),
                        error = %e,
                        "Failed to remove workspace"
                    );
                }
            }
            None => {
                tracing::info!(path = %self.root.display(), "Keeping workspace (cleanup disabled)");
            }
        }
    }
}

fn sanitize(repo_name: &str) -> String {
    repo_name.replace(['/', '\\', ':'], "__")
}

/// Switches the process working directory and restores it on drop.
///
/// The working directory is process-wide; only one guard may be live at a time.
pub struct CurrentDirGuard {
    previous: Option<PathBuf>,
}

impl CurrentDirGuard {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir).map_err(|e| {
            AppError::Workspace(format!("Failed to enter {}: {e}", dir.display()))
        })?;
        Ok(Self {
            previous: Some(previous),
        })
    }

    /// Restore the previous working directory now.
    pub fn restore(mut self) {
        self.restore_inner();
    }

    fn restore_inner(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = std::env::set_current_dir(&previous) {
                tracing::warn!(
                    path = %previous.display(),
                    error = %e,
                    "Failed to restore working directory"
                );
            }
        }
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        self.restore_inner();
    }
}
