//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     waiting-for-dependency → running-setup → handing-off
//!                 ↘               ↘               ↘
//!                               failed (exit non-zero)
//!
//! Shutdown (shutdown.rs):
//!     Broadcast of the received TermSignal to the current stage
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → interrupt the wait or the running step
//!                    → forwarded to the server in supervised mode
//! ```
//!
//! # Design Decisions
//! - One run per container start; restarts belong to the platform
//! - A signal before handoff ends the run with 128 + signo
//! - After an exec handoff the server receives signals directly

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, SignalReceiver};
pub use signals::TermSignal;
pub use startup::{Orchestrator, RunState};
