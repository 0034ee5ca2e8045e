//! Container entrypoint (v1)
//!
//! Gates the application server behind database readiness and one-shot setup.
//!
//! # Architecture Overview
//!
//! ```text
//!   container start
//!        │
//!        ▼
//!   ┌──────────┐   env + optional TOML   ┌──────────────┐
//!   │  config  │────────────────────────▶│ Orchestrator │
//!   └──────────┘                          └──────┬───────┘
//!                                                │
//!        ┌───────────────────────────────────────┼────────────────────────┐
//!        ▼                                       ▼                        ▼
//!   ┌─────────┐  ready   ┌──────────────────────────────────┐  ok   ┌───────────┐
//!   │  probe  │─────────▶│ setup: migrate → collectstatic   │──────▶│  handoff  │──▶ gunicorn
//!   │ (poll)  │          └──────────────────────────────────┘       │  (exec)   │
//!   └─────────┘                                                     └───────────┘
//!        │ any failure
//!        ▼
//!   exit non-zero (step status where available)
//! ```
//!
//! # Environment variables
//!
//! | Variable            | Required | Description                              |
//! |---------------------|----------|------------------------------------------|
//! | `DB_HOST`           | yes      | Database host                            |
//! | `POSTGRES_PORT`     | yes      | Database port                            |
//! | `POSTGRES_USER`     | yes      | Role used by the readiness probe         |
//! | `ENTRYPOINT_CONFIG` | no       | Path to a TOML file overriding defaults  |
//! | `RUST_LOG`          | no       | Log filter, overrides `logging.level`    |

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Instrument;

use container_entrypoint::config::{self, ConfigError, DependencyTarget, EntrypointConfig, LogFormat};
use container_entrypoint::error::{EntrypointError, EXIT_FAILURE};
use container_entrypoint::lifecycle::{signals, Orchestrator, Shutdown};
use container_entrypoint::observability::logging;
use container_entrypoint::setup::SetupStep;

#[derive(Parser)]
#[command(name = "container-entrypoint")]
#[command(about = "Wait for the database, run setup steps, then exec the application server", long_about = None)]
struct Cli {
    /// TOML file overriding the built-in defaults.
    #[arg(short, long, env = "ENTRYPOINT_CONFIG")]
    config: Option<PathBuf>,

    /// Give up after this many readiness probes (default: wait forever).
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds between readiness probes.
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Validate configuration, print the startup plan and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => return abort(&config::LoggingConfig::default(), e.into()),
    };

    logging::init(&config.logging);

    let target = match config::loader::target_from_env() {
        Ok(target) => target,
        Err(e) => return abort(&config.logging, e.into()),
    };

    if cli.check {
        print_plan(&target, &config);
        return ExitCode::SUCCESS;
    }

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);

    async move {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), database = %target, "Entrypoint starting");

        let shutdown = Shutdown::new();
        if let Err(e) = signals::listen(shutdown.clone()) {
            tracing::warn!(error = %e, "Could not install signal handlers");
        }

        let mut orchestrator = Orchestrator::from_config(target, &config, shutdown);
        match orchestrator.run().await {
            Ok(code) => exit_code(code),
            Err(e) => exit_code(e.exit_code()),
        }
    }
    .instrument(span)
    .await
}

/// Load the optional file, apply CLI overrides, validate.
fn resolve_config(cli: &Cli) -> Result<EntrypointConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::loader::load_config(path)?,
        None => EntrypointConfig::default(),
    };

    if cli.max_attempts.is_some() {
        config.probe.max_attempts = cli.max_attempts;
    }
    if let Some(secs) = cli.poll_interval_secs {
        config.probe.interval_secs = secs;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    config::validation::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn abort(logging_config: &config::LoggingConfig, error: EntrypointError) -> ExitCode {
    logging::init(logging_config);
    tracing::error!(error = %error, "Configuration error");
    exit_code(error.exit_code())
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(EXIT_FAILURE as u8))
}

fn print_plan(target: &DependencyTarget, config: &EntrypointConfig) {
    let orchestrator = Orchestrator::from_config(target.clone(), config, Shutdown::new());

    println!("database:  {} (probe: {:?})", target, config.probe.method);
    match config.probe.max_attempts {
        Some(max) => println!("polling:   every {}s, at most {} attempts", config.probe.interval_secs, max),
        None => println!("polling:   every {}s, until ready", config.probe.interval_secs),
    }
    for dir in &config.runtime.ensure_dirs {
        println!("mkdir:     {}", dir.display());
    }
    for (index, step) in orchestrator.steps().iter().enumerate() {
        println!("step {}:    {} ({})", index + 1, step, step.name());
    }
    println!("server:    {} [{:?}]", orchestrator.launch(), config.server.handoff);
}
