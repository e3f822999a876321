use std::path::Path;

use chrono::{DateTime, Utc};

use crate::workspace::git::Git;

/// Resolve the remote's default branch, falling back to `fallback` when it
/// cannot be determined.
///
/// The clone records the remote HEAD locally as `origin/HEAD`, which needs no
/// network access and so also works once the credential is gone from the
/// remote URL. `git remote show origin` is only asked when that ref is missing.
pub async fn resolve_default_branch(git: &dyn Git, dir: &Path, fallback: &str) -> String {
    match git.origin_head(dir).await {
        Ok(head) => {
            if let Some(branch) = parse_origin_head(&head) {
                return branch;
            }
        }
        Err(e) => tracing::debug!(error = %e, "No local origin/HEAD"),
    }

    match git.remote_info(dir).await {
        Ok(info) => match parse_head_branch(&info) {
            Some(branch) => branch,
            None => {
                tracing::debug!(fallback, "Remote did not report a HEAD branch");
                fallback.to_string()
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, fallback, "Default branch detection failed");
            fallback.to_string()
        }
    }
}

/// `origin/main` -> `main`.
pub fn parse_origin_head(head: &str) -> Option<String> {
    let branch = head.trim().strip_prefix("origin/")?;
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch.to_string())
    }
}

/// Extract the branch from a `HEAD branch: <name>` line.
pub fn parse_head_branch(remote_info: &str) -> Option<String> {
    remote_info.lines().find_map(|line| {
        let branch = line.trim().strip_prefix("HEAD branch:")?.trim();
        // git prints "(unknown)" when the remote HEAD is ambiguous
        if branch.is_empty() || branch.starts_with('(') {
            None
        } else {
            Some(branch.to_string())
        }
    })
}

/// `{prefix}/{YYYYmmdd-HHMMSS}` in UTC.
///
/// Two runs started within the same second produce the same name; callers
/// that may overlap must pass an explicit branch name.
pub fn generate_branch_name(prefix: &str, now: DateTime<Utc>) -> String {
    let prefix = prefix.trim_end_matches('/');
    format!("{prefix}/{}", now.format("%Y%m%d-%H%M%S"))
}
