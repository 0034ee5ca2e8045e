//! Configuration schema definitions.
//!
//! The database target is taken from the environment only; everything else
//! has a default and may be overridden from a TOML file.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// The database the orchestrator waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTarget {
    /// Host name or address (`DB_HOST`).
    pub host: String,

    /// TCP port (`POSTGRES_PORT`).
    pub port: u16,

    /// Role used by the readiness probe (`POSTGRES_USER`).
    pub user: String,
}

impl DependencyTarget {
    /// `host:port`, as used for TCP probes and log lines.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Root configuration for a startup run.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EntrypointConfig {
    /// Readiness probe settings.
    pub probe: ProbeConfig,

    /// Commands for the setup steps.
    pub setup: SetupConfig,

    /// Application server launch settings.
    pub server: ServerConfig,

    /// Filesystem preparation before setup.
    pub runtime: RuntimeConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// How readiness is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum ProbeMethod {
    /// Run `pg_isready` against the target.
    #[default]
    #[serde(rename = "pg_isready")]
    PgIsReady,

    /// Open a plain TCP connection to `host:port`.
    #[serde(rename = "tcp")]
    Tcp,
}

/// Delay schedule between failed probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PollSchedule {
    /// Sleep exactly `interval_secs` between attempts.
    #[default]
    Fixed,

    /// Jittered exponential growth from `interval_secs` up to `max_interval_secs`.
    Exponential,
}

/// Readiness probe configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Check implementation.
    pub method: ProbeMethod,

    /// Program invoked for the `pg_isready` method.
    pub pg_isready_program: String,

    /// Delay between attempts in seconds.
    pub interval_secs: u64,

    /// Upper bound for a single check in seconds.
    pub check_timeout_secs: u64,

    /// Give up after this many attempts. `None` waits forever.
    pub max_attempts: Option<u32>,

    /// Delay schedule.
    pub schedule: PollSchedule,

    /// Cap for the exponential schedule in seconds.
    pub max_interval_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            method: ProbeMethod::PgIsReady,
            pg_isready_program: "pg_isready".to_string(),
            interval_secs: 2,
            check_timeout_secs: 5,
            max_attempts: None,
            schedule: PollSchedule::Fixed,
            max_interval_secs: 30,
        }
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Setup step commands. The order is fixed: migrate, then collect static.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Applies pending schema migrations non-interactively.
    pub migrate: CommandConfig,

    /// Stages static assets, clearing previously staged files.
    pub collect_static: CommandConfig,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            migrate: CommandConfig::new("python", &["manage.py", "migrate", "--noinput"]),
            collect_static: CommandConfig::new(
                "python",
                &["manage.py", "collectstatic", "--noinput", "--clear"],
            ),
        }
    }
}

/// How control is passed to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandoffMode {
    /// Replace this process with the server (unix only).
    #[default]
    Exec,

    /// Spawn the server, forward termination signals, exit with its status.
    Supervised,
}

/// Application server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server executable.
    pub program: String,

    /// Positional arguments placed before the bind/worker/timeout flags.
    pub args: Vec<String>,

    /// Address the server binds to.
    pub bind_address: String,

    /// Worker process count.
    pub workers: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Handoff strategy.
    pub handoff: HandoffMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            program: "gunicorn".to_string(),
            args: vec!["libarary.wsgi:application".to_string()],
            bind_address: "0.0.0.0:8000".to_string(),
            workers: 3,
            timeout_secs: 120,
            handoff: HandoffMode::Exec,
        }
    }
}

/// Filesystem preparation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directories created (if missing) before the setup steps run.
    pub ensure_dirs: Vec<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ensure_dirs: vec![PathBuf::from("logs")],
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
