//! Setup steps and the command-backed implementation.

use std::fmt;
use std::future::Future;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::config::CommandConfig;
use crate::error::{launch_error_code, EXIT_FAILURE};

/// Why a step did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum StepFailure {
    #[error("exited with status {0}")]
    Exit(i32),

    #[error("terminated by signal {0}")]
    Signal(i32),

    #[error("could not launch `{program}`: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StepFailure {
    /// Status propagated as the orchestrator's exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            StepFailure::Exit(code) if *code != 0 => *code,
            StepFailure::Exit(_) => EXIT_FAILURE,
            StepFailure::Signal(signo) => 128 + signo,
            StepFailure::Launch { source, .. } => launch_error_code(source),
            StepFailure::Io(_) => EXIT_FAILURE,
        }
    }
}

/// A named one-shot action run before the server starts.
pub trait SetupStep {
    fn name(&self) -> &str;

    fn run(&self) -> impl Future<Output = Result<(), StepFailure>> + Send;
}

/// A step that runs an external program with inherited stdio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandStep {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(name: impl Into<String>, config: &CommandConfig) -> Self {
        Self::new(name, config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl SetupStep for CommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), StepFailure> {
        tracing::debug!(step = %self.name, command = %self, "Launching setup command");

        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| StepFailure::Launch {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(failure_for(&status))
        }
    }
}

fn failure_for(status: &ExitStatus) -> StepFailure {
    if let Some(code) = status.code() {
        return StepFailure::Exit(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            return StepFailure::Signal(signo);
        }
    }

    StepFailure::Exit(EXIT_FAILURE)
}
