//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, worker count > 0, ports valid)
//! - Reject empty programs before anything is launched
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EntrypointConfig → Result<(), Vec<ValidationError>>
//! - Runs before the first probe

use crate::config::schema::{EntrypointConfig, PollSchedule};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),

    #[error("environment variable {0} is empty")]
    EmptyVariable(&'static str),

    #[error("environment variable {name} must be a port number in 1-65535, got {value:?}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{0} must name a program")]
    EmptyProgram(&'static str),

    #[error("probe.max_interval_secs ({max}) is below probe.interval_secs ({interval})")]
    IntervalCap { interval: u64, max: u64 },

    #[error("server.bind_address {0:?} is not host:port or unix:path")]
    InvalidBind(String),
}

/// Check the file/CLI configuration for values that cannot work.
pub fn validate_config(config: &EntrypointConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let probe = &config.probe;
    if probe.interval_secs == 0 {
        errors.push(ValidationError::NotPositive("probe.interval_secs"));
    }
    if probe.check_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("probe.check_timeout_secs"));
    }
    if probe.max_attempts == Some(0) {
        errors.push(ValidationError::NotPositive("probe.max_attempts"));
    }
    if probe.schedule == PollSchedule::Exponential && probe.max_interval_secs < probe.interval_secs {
        errors.push(ValidationError::IntervalCap {
            interval: probe.interval_secs,
            max: probe.max_interval_secs,
        });
    }
    if probe.pg_isready_program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram("probe.pg_isready_program"));
    }

    if config.setup.migrate.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram("setup.migrate.program"));
    }
    if config.setup.collect_static.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram("setup.collect_static.program"));
    }

    let server = &config.server;
    if server.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram("server.program"));
    }
    if server.workers == 0 {
        errors.push(ValidationError::NotPositive("server.workers"));
    }
    if server.timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("server.timeout_secs"));
    }
    if !is_valid_bind(&server.bind_address) {
        errors.push(ValidationError::InvalidBind(server.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_bind(bind: &str) -> bool {
    if let Some(path) = bind.strip_prefix("unix:") {
        return !path.is_empty();
    }
    match bind.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p > 0),
        None => false,
    }
}
