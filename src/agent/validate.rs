use std::path::Path;

use crate::error::{AppError, Result};
use crate::workspace::process;

/// Run the validation command through `sh -c` inside `workspace`.
///
/// A non-zero exit becomes [`AppError::Validation`] carrying both streams.
pub async fn run_validation(command: &str, workspace: &Path) -> Result<()> {
    tracing::info!(command = %command, "Running validation");

    match process::run("sh", &["-c", command], Some(workspace)).await {
        Ok(output) => {
            tracing::debug!(stdout = %output.stdout, stderr = %output.stderr, "Validation passed");
            Ok(())
        }
        Err(AppError::Process { stdout, stderr, .. }) => {
            tracing::warn!("Validation failed");
            Err(AppError::Validation { stdout, stderr })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_passes() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("ok.txt"), "").unwrap();
        assert!(run_validation("test -f ok.txt", tmp.path()).await.is_ok());
    }

    #[tokio::test]
    async fn test_validation_failure_carries_output() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_validation("echo 2 passed; echo 1 failed >&2; exit 1", tmp.path())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed\nSTDOUT:\n2 passed\n\nSTDERR:\n1 failed\n"
        );
    }
}
