//! Container startup orchestrator library.
//!
//! Waits for the database, runs schema migration and static asset
//! collection, then hands the container over to the application server.

pub mod config;
pub mod error;
pub mod handoff;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod resilience;
pub mod setup;

pub use config::schema::EntrypointConfig;
pub use error::EntrypointError;
pub use lifecycle::{Orchestrator, Shutdown};
