//! Setup sequencing subsystem.
//!
//! # Data Flow
//! ```text
//! database ready
//!     → dirs.rs (create runtime directories)
//!     → sequencer.rs
//!         → migrate-schema         (python manage.py migrate --noinput)
//!         → collect-static-assets  (python manage.py collectstatic --noinput --clear)
//!     → handoff
//! ```
//!
//! # Design Decisions
//! - The order is fixed; migrations must match the code before anything serves
//! - The first failing step aborts the run with that step's exit status
//! - No rollback: both steps are safe to re-run on the next container start

pub mod dirs;
pub mod sequencer;
pub mod step;

pub use dirs::prepare_runtime_dirs;
pub use sequencer::run_setup;
pub use step::{CommandStep, SetupStep, StepFailure};

use crate::config::SetupConfig;

pub const MIGRATE_SCHEMA: &str = "migrate-schema";
pub const COLLECT_STATIC_ASSETS: &str = "collect-static-assets";
pub const PREPARE_RUNTIME_DIRS: &str = "prepare-runtime-dirs";

/// A setup step that did not succeed.
#[derive(Debug, thiserror::Error)]
#[error("setup step `{step}` failed: {failure}")]
pub struct SetupError {
    pub step: String,
    #[source]
    pub failure: StepFailure,
}

impl SetupError {
    pub fn exit_code(&self) -> i32 {
        self.failure.exit_code()
    }
}

/// The fixed step list: migrate the schema, then collect static assets.
pub fn plan(config: &SetupConfig) -> Vec<CommandStep> {
    vec![
        CommandStep::from_config(MIGRATE_SCHEMA, &config.migrate),
        CommandStep::from_config(COLLECT_STATIC_ASSETS, &config.collect_static),
    ]
}
