//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed readiness probe:
//!     → backoff.rs (how long to wait before the next attempt)
//! ```
//!
//! # Design Decisions
//! - A fixed interval is the default; an unready database is not an error
//! - Exponential backoff is opt-in and jittered
//! - Total wait is bounded by the container platform unless an attempt limit is set

pub mod backoff;

pub use backoff::PollDelay;
