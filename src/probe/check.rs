//! Readiness checks.
//!
//! # Responsibilities
//! - Run one lightweight check against the database
//! - Classify the result as ready, not ready, or unusable
//!
//! # Design Decisions
//! - Refused connections and timeouts are "not ready", never errors
//! - A check that cannot run at all (missing binary, rejected parameters)
//!   is fatal: retrying would never succeed

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time;

use crate::config::{DependencyTarget, ProbeConfig, ProbeMethod};
use crate::probe::ProbeError;

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Ready,
    /// The database did not accept the connection; carries a short reason.
    NotReady(String),
}

/// One readiness check against a target.
pub trait ReadinessCheck {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn check(
        &self,
        target: &DependencyTarget,
    ) -> impl Future<Output = Result<CheckOutcome, ProbeError>> + Send;
}

/// `pg_isready` exit status: server is accepting connections.
const PG_ACCEPTING: i32 = 0;
/// `pg_isready` exit status: no attempt was made (invalid parameters).
const PG_NO_ATTEMPT: i32 = 3;

/// Runs `pg_isready -h HOST -p PORT -U USER`.
#[derive(Debug, Clone)]
pub struct PgIsReady {
    program: String,
    timeout: Duration,
}

impl PgIsReady {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, target: &DependencyTarget) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-h")
            .arg(&target.host)
            .arg("-p")
            .arg(target.port.to_string())
            .arg("-U")
            .arg(&target.user)
            .arg("-t")
            .arg(self.timeout.as_secs().max(1).to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl ReadinessCheck for PgIsReady {
    fn name(&self) -> &'static str {
        "pg_isready"
    }

    async fn check(&self, target: &DependencyTarget) -> Result<CheckOutcome, ProbeError> {
        let mut command = self.command(target);

        // pg_isready enforces -t itself; the extra second covers process startup.
        let output = match time::timeout(self.timeout + Duration::from_secs(1), command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ProbeError::Unavailable {
                    program: self.program.clone(),
                    source,
                })
            }
            Err(_) => return Ok(CheckOutcome::NotReady("pg_isready timed out".to_string())),
        };

        let detail = describe_output(&output.stdout, &output.stderr);
        match output.status.code() {
            Some(PG_ACCEPTING) => Ok(CheckOutcome::Ready),
            Some(PG_NO_ATTEMPT) => Err(ProbeError::InvalidTarget(
                detail.unwrap_or_else(|| "pg_isready made no connection attempt".to_string()),
            )),
            Some(code) => Ok(CheckOutcome::NotReady(
                detail.unwrap_or_else(|| format!("pg_isready exited with status {}", code)),
            )),
            None => Ok(CheckOutcome::NotReady("pg_isready was terminated".to_string())),
        }
    }
}

fn describe_output(stdout: &[u8], stderr: &[u8]) -> Option<String> {
    [stdout, stderr]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .find(|text| !text.is_empty())
}

/// Opens a TCP connection to `host:port` and drops it.
#[derive(Debug, Clone)]
pub struct TcpConnect {
    timeout: Duration,
}

impl TcpConnect {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ReadinessCheck for TcpConnect {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn check(&self, target: &DependencyTarget) -> Result<CheckOutcome, ProbeError> {
        let address = target.address();
        match time::timeout(self.timeout, TcpStream::connect(address.as_str())).await {
            Ok(Ok(_stream)) => Ok(CheckOutcome::Ready),
            Ok(Err(e)) => Ok(CheckOutcome::NotReady(e.to_string())),
            Err(_) => Ok(CheckOutcome::NotReady(format!(
                "connect timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// The configured check.
#[derive(Debug, Clone)]
pub enum Check {
    PgIsReady(PgIsReady),
    Tcp(TcpConnect),
}

impl Check {
    pub fn from_config(config: &ProbeConfig) -> Self {
        let timeout = Duration::from_secs(config.check_timeout_secs);
        match config.method {
            ProbeMethod::PgIsReady => {
                Check::PgIsReady(PgIsReady::new(config.pg_isready_program.clone(), timeout))
            }
            ProbeMethod::Tcp => Check::Tcp(TcpConnect::new(timeout)),
        }
    }
}

impl ReadinessCheck for Check {
    fn name(&self) -> &'static str {
        match self {
            Check::PgIsReady(c) => c.name(),
            Check::Tcp(c) => c.name(),
        }
    }

    async fn check(&self, target: &DependencyTarget) -> Result<CheckOutcome, ProbeError> {
        match self {
            Check::PgIsReady(c) => c.check(target).await,
            Check::Tcp(c) => c.check(target).await,
        }
    }
}
