use std::path::Path;

use crate::error::{AppError, Result};
use crate::workspace::process;

/// Environment variable pointing the agent at the checkout.
pub const WORKSPACE_ENV: &str = "MINI_AGENT_WORKSPACE";

/// Run the agent command through `sh -c` inside `workspace`.
///
/// Returns the agent's stdout. A non-zero exit becomes [`AppError::Agent`].
pub async fn run_agent(command: &str, workspace: &Path) -> Result<String> {
    let workspace_str = workspace.to_string_lossy().into_owned();
    tracing::info!(command = %command, "Running agent");

    match process::run_with_env(
        "sh",
        &["-c", command],
        Some(workspace),
        &[(WORKSPACE_ENV, workspace_str.as_str())],
    )
    .await
    {
        Ok(output) => {
            tracing::debug!(stderr = %output.stderr, "Agent finished");
            Ok(output.stdout)
        }
        Err(AppError::Process {
            exit_code, stderr, ..
        }) => Err(AppError::Agent(format!(
            "agent command exited with {}: {}",
            exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            stderr.trim()
        ))),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_agent_runs_in_workspace_and_sees_env() {
        let tmp = tempfile::tempdir().unwrap();
        let stdout = run_agent(
            "echo edited > out.txt && printf '%s' \"$MINI_AGENT_WORKSPACE\"",
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(tmp.path().join("out.txt")).unwrap(),
            "edited\n"
        );
        assert_eq!(stdout, tmp.path().to_string_lossy());
    }

    #[tokio::test]
    async fn test_agent_failure_is_agent_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_agent("echo nope >&2; exit 2", tmp.path())
            .await
            .unwrap_err();
        match err {
            AppError::Agent(msg) => {
                assert!(msg.contains("exited with 2"));
                assert!(msg.contains("nope"));
            }
            other => panic!("expected agent error, got {other:?}"),
        }
    }
}
