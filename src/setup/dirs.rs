//! Runtime directory preparation.

use std::path::PathBuf;

use crate::setup::{SetupError, StepFailure, PREPARE_RUNTIME_DIRS};

/// Create each directory (and its parents) if it does not exist yet.
pub async fn prepare_runtime_dirs(dirs: &[PathBuf]) -> Result<(), SetupError> {
    for dir in dirs {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!(path = %dir.display(), error = %e, "Failed to create runtime directory");
            return Err(SetupError {
                step: PREPARE_RUNTIME_DIRS.to_string(),
                failure: StepFailure::Io(e),
            });
        }
        tracing::debug!(path = %dir.display(), "Runtime directory ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_nested_and_existing() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("logs");
        let nested = root.path().join("var/run/app");
        std::fs::create_dir(&logs).unwrap();

        prepare_runtime_dirs(&[logs.clone(), nested.clone()]).await.unwrap();

        assert!(logs.is_dir());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_file_in_the_way_fails() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("logs");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = prepare_runtime_dirs(&[blocker]).await.unwrap_err();
        assert_eq!(err.step, PREPARE_RUNTIME_DIRS);
    }
}
