//! Error taxonomy for a startup run and its mapping to process exit codes.
//!
//! # Exit codes
//! - Configuration error: `78` (`EX_CONFIG`)
//! - Database never became ready within the attempt limit, or the readiness
//!   check itself cannot run: `69` (`EX_UNAVAILABLE`)
//! - Setup step failure: the step's own exit status, `128 + signo` when it was
//!   killed by a signal, `127` when it could not be launched
//! - Handoff failure: `127` (not found), `126` (not executable), `1` otherwise
//! - Termination signal received before handoff: `128 + signo`

use std::process::ExitStatus;

use crate::config::ConfigError;
use crate::handoff::HandoffError;
use crate::lifecycle::signals::TermSignal;
use crate::probe::ProbeError;
use crate::setup::SetupError;

/// Generic non-zero status used when no underlying status is available.
pub const EXIT_FAILURE: i32 = 1;
/// sysexits.h `EX_UNAVAILABLE`.
pub const EXIT_UNAVAILABLE: i32 = 69;
/// sysexits.h `EX_CONFIG`.
pub const EXIT_CONFIG: i32 = 78;
/// Shell convention for "found but not executable".
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Shell convention for "command not found".
pub const EXIT_NOT_FOUND: i32 = 127;

/// Any failure that aborts a startup run.
#[derive(Debug, thiserror::Error)]
pub enum EntrypointError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database at {address} was not ready after {attempts} attempts")]
    DependencyTimedOut { address: String, attempts: u32 },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Handoff(#[from] HandoffError),

    #[error("interrupted by {0}")]
    Interrupted(TermSignal),
}

impl EntrypointError {
    /// Status the orchestrator should exit with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EntrypointError::Config(_) => EXIT_CONFIG,
            EntrypointError::DependencyTimedOut { .. } => EXIT_UNAVAILABLE,
            EntrypointError::Probe(e) => e.exit_code(),
            EntrypointError::Setup(e) => e.exit_code(),
            EntrypointError::Handoff(e) => e.exit_code(),
            EntrypointError::Interrupted(signal) => signal.exit_code(),
        }
    }
}

/// Translate a child's exit status into the code we propagate.
pub fn status_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            return 128 + signo;
        }
    }

    EXIT_FAILURE
}

/// Map an exec/spawn error to the shell's conventional status.
pub fn launch_error_code(error: &std::io::Error) -> i32 {
    match error.kind() {
        std::io::ErrorKind::NotFound => EXIT_NOT_FOUND,
        std::io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ValidationError;
    use crate::setup::StepFailure;

    #[test]
    fn test_config_errors_use_ex_config() {
        let err: EntrypointError =
            ConfigError::Validation(vec![ValidationError::MissingVariable("DB_HOST")]).into();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn test_setup_failure_propagates_step_status() {
        let err: EntrypointError = SetupError {
            step: "migrate-schema".into(),
            failure: StepFailure::Exit(3),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("migrate-schema"));
    }

    #[test]
    fn test_interrupted_uses_signal_code() {
        assert_eq!(EntrypointError::Interrupted(TermSignal::Terminate).exit_code(), 143);
        assert_eq!(EntrypointError::Interrupted(TermSignal::Interrupt).exit_code(), 130);
    }

    #[test]
    fn test_launch_error_codes() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let other = std::io::Error::from(std::io::ErrorKind::Other);
        assert_eq!(launch_error_code(&missing), EXIT_NOT_FOUND);
        assert_eq!(launch_error_code(&denied), EXIT_NOT_EXECUTABLE);
        assert_eq!(launch_error_code(&other), EXIT_FAILURE);
    }
}
