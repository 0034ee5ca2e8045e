//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All stages produce:
//!     → logging.rs (structured log events on stdout)
//!
//! Every event is recorded inside a `run` span carrying the run_id, so the
//! lines of one container start can be correlated.
//! ```
//!
//! # Design Decisions
//! - Structured fields (stage, step, attempt) for machine parsing
//! - Nothing is buffered: lines must be out before exec replaces the process

pub mod logging;
