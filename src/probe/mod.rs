//! Readiness probing subsystem.
//!
//! # Data Flow
//! ```text
//! prober.rs (loop):
//!     check.rs (pg_isready | tcp)
//!     → Ready       → return, setup may begin
//!     → NotReady    → log, sleep PollDelay, retry
//!     → fatal error → abort the run
//! ```
//!
//! # Design Decisions
//! - An unready database is the expected state at container start, not an error
//! - No attempt cap by default; the platform's startup timeout bounds the wait
//! - The poll sleep is the only place a termination signal is awaited

pub mod check;
pub mod prober;

pub use check::{Check, CheckOutcome, PgIsReady, ReadinessCheck, TcpConnect};
pub use prober::{Prober, Readiness};

use crate::error::{EXIT_CONFIG, EXIT_UNAVAILABLE};
use crate::lifecycle::signals::TermSignal;

/// Failures that end the wait without the database becoming ready.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("readiness check `{program}` could not be run: {source}")]
    Unavailable {
        program: String,
        source: std::io::Error,
    },

    #[error("readiness check rejected the connection parameters: {0}")]
    InvalidTarget(String),

    #[error("interrupted by {0} while waiting for the database")]
    Interrupted(TermSignal),
}

impl ProbeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::Unavailable { .. } => EXIT_UNAVAILABLE,
            ProbeError::InvalidTarget(_) => EXIT_CONFIG,
            ProbeError::Interrupted(signal) => signal.exit_code(),
        }
    }
}
