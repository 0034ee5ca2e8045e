//! Process handoff subsystem.
//!
//! # Data Flow
//! ```text
//! setup complete
//!     → launch.rs (gunicorn APP --bind 0.0.0.0:8000 --workers 3 --timeout 120)
//!     → exec.rs        (unix, default): execvp, the server takes over this PID
//!     → supervised.rs  (fallback):      spawn, forward SIGTERM/SIGINT, exit with child status
//! ```
//!
//! # Design Decisions
//! - Exec is a transfer of control, not spawn-and-wait: nothing of the
//!   entrypoint survives on the success path
//! - Launch failures are fatal and never retried

#[cfg(unix)]
pub mod exec;
pub mod launch;
pub mod supervised;

use std::future::Future;

#[cfg(unix)]
pub use exec::ExecHandoff;
pub use launch::ServerLaunch;
pub use supervised::SupervisedHandoff;

use crate::config::HandoffMode;
use crate::error::{launch_error_code, EXIT_FAILURE};
use crate::lifecycle::Shutdown;

/// Errors raised while handing control to the server.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("failed to exec server `{program}`: {source}")]
    Exec {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to spawn server `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed waiting for server: {0}")]
    Wait(std::io::Error),
}

impl HandoffError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HandoffError::Exec { source, .. } | HandoffError::Spawn { source, .. } => {
                launch_error_code(source)
            }
            HandoffError::Wait(_) => EXIT_FAILURE,
        }
    }
}

/// Transfers control to the server.
pub trait Handoff {
    /// Start the server.
    ///
    /// Returns the server's exit status when the entrypoint outlives it
    /// (supervised mode). An exec handoff never returns `Ok`.
    fn hand_off(&self, launch: &ServerLaunch) -> impl Future<Output = Result<i32, HandoffError>> + Send;
}

/// The configured handoff strategy.
#[derive(Debug, Clone)]
pub enum ServerHandoff {
    #[cfg(unix)]
    Exec(ExecHandoff),
    Supervised(SupervisedHandoff),
}

impl ServerHandoff {
    /// Pick the strategy for `mode`; exec falls back to supervised where
    /// the platform cannot replace the process image.
    pub fn from_mode(mode: HandoffMode, shutdown: Shutdown) -> Self {
        match mode {
            #[cfg(unix)]
            HandoffMode::Exec => ServerHandoff::Exec(ExecHandoff),
            #[cfg(not(unix))]
            HandoffMode::Exec => {
                tracing::warn!("Exec handoff unavailable on this platform, supervising server instead");
                ServerHandoff::Supervised(SupervisedHandoff::new(shutdown))
            }
            HandoffMode::Supervised => ServerHandoff::Supervised(SupervisedHandoff::new(shutdown)),
        }
    }
}

impl Handoff for ServerHandoff {
    async fn hand_off(&self, launch: &ServerLaunch) -> Result<i32, HandoffError> {
        match self {
            #[cfg(unix)]
            ServerHandoff::Exec(h) => h.hand_off(launch).await,
            ServerHandoff::Supervised(h) => h.hand_off(launch).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        let supervised = ServerHandoff::from_mode(HandoffMode::Supervised, Shutdown::new());
        assert!(matches!(supervised, ServerHandoff::Supervised(_)));

        let exec = ServerHandoff::from_mode(HandoffMode::Exec, Shutdown::new());
        #[cfg(unix)]
        assert!(matches!(exec, ServerHandoff::Exec(_)));
        #[cfg(not(unix))]
        assert!(matches!(exec, ServerHandoff::Supervised(_)));
    }
}
