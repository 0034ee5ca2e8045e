//! Handoff by replacing the process image.

use crate::handoff::launch::ServerLaunch;
use crate::handoff::{Handoff, HandoffError};

/// `execvp` the server. Only returns if the exec failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecHandoff;

impl Handoff for ExecHandoff {
    async fn hand_off(&self, launch: &ServerLaunch) -> Result<i32, HandoffError> {
        use std::os::unix::process::CommandExt;

        tracing::info!(command = %launch, "Replacing entrypoint with server process");

        // `exec` only returns on error. On success the server owns this PID.
        let source = std::process::Command::new(launch.program())
            .args(launch.argv())
            .exec();

        Err(HandoffError::Exec {
            program: launch.program().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_returns_not_found() {
        let launch = ServerLaunch::new("/nonexistent/gunicorn", Vec::new(), "0.0.0.0:8000", 3, 120);
        let err = ExecHandoff.hand_off(&launch).await.unwrap_err();
        assert!(matches!(err, HandoffError::Exec { .. }));
        assert_eq!(err.exit_code(), 127);
    }

    #[tokio::test]
    async fn test_non_executable_returns_126() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let program = file.path().to_string_lossy().into_owned();
        let launch = ServerLaunch::new(program, Vec::new(), "0.0.0.0:8000", 3, 120);

        let err = ExecHandoff.hand_off(&launch).await.unwrap_err();
        assert_eq!(err.exit_code(), 126);
    }
}
