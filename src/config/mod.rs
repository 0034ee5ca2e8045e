//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! DB_HOST / POSTGRES_PORT / POSTGRES_USER
//!     → loader.rs (target_from_env)
//!     → DependencyTarget (validated, immutable)
//!
//! optional TOML file (--config / ENTRYPOINT_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides
//!     → validation.rs (semantic checks)
//!     → EntrypointConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - The environment is read once, at startup, into explicit structs
//! - All file fields have defaults; an absent file means all defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::CommandConfig;
pub use schema::DependencyTarget;
pub use schema::EntrypointConfig;
pub use schema::HandoffMode;
pub use schema::LogFormat;
pub use schema::LoggingConfig;
pub use schema::PollSchedule;
pub use schema::ProbeConfig;
pub use schema::ProbeMethod;
pub use schema::ServerConfig;
pub use schema::SetupConfig;
