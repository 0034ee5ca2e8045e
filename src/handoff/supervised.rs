//! Handoff by spawning the server and relaying termination signals.
//!
//! Used where the process image cannot be replaced, or when configured
//! explicitly. The entrypoint stays alive as the server's parent and exits
//! with the server's status.

use tokio::process::{Child, Command};

use crate::error::status_code;
use crate::handoff::launch::ServerLaunch;
use crate::handoff::{Handoff, HandoffError};
use crate::lifecycle::signals::TermSignal;
use crate::lifecycle::Shutdown;

#[derive(Debug, Clone)]
pub struct SupervisedHandoff {
    shutdown: Shutdown,
}

impl SupervisedHandoff {
    pub fn new(shutdown: Shutdown) -> Self {
        Self { shutdown }
    }
}

impl Handoff for SupervisedHandoff {
    async fn hand_off(&self, launch: &ServerLaunch) -> Result<i32, HandoffError> {
        let mut signals = self.shutdown.subscribe();

        let mut child = Command::new(launch.program())
            .args(launch.argv())
            .spawn()
            .map_err(|source| HandoffError::Spawn {
                program: launch.program().to_string(),
                source,
            })?;

        tracing::info!(command = %launch, pid = ?child.id(), "Server started under supervision");

        loop {
            tokio::select! {
                status = child.wait() => {
                    let status = status.map_err(HandoffError::Wait)?;
                    let code = status_code(&status);
                    tracing::info!(exit_code = code, "Server exited");
                    return Ok(code);
                }
                Some(signal) = signals.recv() => {
                    tracing::info!(signal = %signal, "Forwarding signal to server");
                    forward(&mut child, signal);
                }
            }
        }
    }
}

#[cfg(unix)]
fn forward(child: &mut Child, signal: TermSignal) {
    let Some(pid) = child.id() else {
        return;
    };
    // SAFETY: plain kill(2) on a PID we spawned and have not reaped yet.
    let rc = unsafe { libc::kill(pid as libc::pid_t, signal.signo()) };
    if rc != 0 {
        tracing::warn!(
            pid,
            error = %std::io::Error::last_os_error(),
            "Failed to forward signal"
        );
    }
}

#[cfg(not(unix))]
fn forward(child: &mut Child, _signal: TermSignal) {
    if let Err(e) = child.start_kill() {
        tracing::warn!(error = %e, "Failed to stop server");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh(script: &str) -> ServerLaunch {
        // argv() appends --bind/--workers/--timeout; `sh -c` leaves them as $0.. positional args.
        ServerLaunch::new("sh", vec!["-c".into(), script.into()], "0.0.0.0:8000", 3, 120)
    }

    #[tokio::test]
    async fn test_returns_server_exit_status() {
        let handoff = SupervisedHandoff::new(Shutdown::new());
        let code = handoff.hand_off(&sh("exit 7")).await.unwrap();
        assert_eq!(code, 7);
    }

    #[tokio::test]
    async fn test_passes_server_arguments() {
        let handoff = SupervisedHandoff::new(Shutdown::new());
        let launch = sh(r#"[ "$0 $1 $2 $3 $4 $5" = "--bind 0.0.0.0:8000 --workers 3 --timeout 120" ]"#);
        assert_eq!(handoff.hand_off(&launch).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_forwards_sigterm() {
        let shutdown = Shutdown::new();
        let handoff = SupervisedHandoff::new(shutdown.clone());

        let task = tokio::spawn(async move { handoff.hand_off(&sh("exec sleep 30")).await });

        tokio::time::sleep(Duration::from_millis(300)).await;
        shutdown.trigger(TermSignal::Terminate);

        let code = tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(code, 143);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let handoff = SupervisedHandoff::new(Shutdown::new());
        let launch = ServerLaunch::new("/nonexistent/gunicorn", Vec::new(), "0.0.0.0:8000", 3, 120);
        let err = handoff.hand_off(&launch).await.unwrap_err();
        assert!(matches!(err, HandoffError::Spawn { .. }));
        assert_eq!(err.exit_code(), 127);
    }
}
