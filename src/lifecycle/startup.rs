//! Startup orchestration.
//!
//! # Responsibilities
//! - Wait for the database
//! - Prepare runtime directories and run the setup steps in order
//! - Hand control to the application server
//!
//! # Design Decisions
//! - Fail fast: any stage error is fatal and ends the run
//! - Stages run strictly in sequence, never concurrently
//! - The server starts last (traffic only when the schema and assets are in place)

use std::fmt;
use std::path::PathBuf;

use crate::config::{DependencyTarget, EntrypointConfig};
use crate::error::EntrypointError;
use crate::handoff::{Handoff, ServerHandoff, ServerLaunch};
use crate::lifecycle::Shutdown;
use crate::probe::{Check, Prober, ReadinessCheck, Readiness};
use crate::setup::{self, CommandStep, SetupStep};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Starting,
    WaitingForDependency,
    RunningSetup,
    HandingOff,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Starting => "starting",
            RunState::WaitingForDependency => "waiting-for-dependency",
            RunState::RunningSetup => "running-setup",
            RunState::HandingOff => "handing-off",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One linear startup run: probe → setup → handoff.
pub struct Orchestrator<C, S, H> {
    target: DependencyTarget,
    prober: Prober<C>,
    steps: Vec<S>,
    runtime_dirs: Vec<PathBuf>,
    launch: ServerLaunch,
    handoff: H,
    shutdown: Shutdown,
    state: RunState,
}

impl Orchestrator<Check, CommandStep, ServerHandoff> {
    /// Wire the production components from validated configuration.
    pub fn from_config(target: DependencyTarget, config: &EntrypointConfig, shutdown: Shutdown) -> Self {
        let prober = Prober::from_config(Check::from_config(&config.probe), &config.probe);
        let handoff = ServerHandoff::from_mode(config.server.handoff, shutdown.clone());

        Orchestrator::new(
            target,
            prober,
            setup::plan(&config.setup),
            ServerLaunch::from_config(&config.server),
            handoff,
        )
        .with_runtime_dirs(config.runtime.ensure_dirs.clone())
        .with_shutdown(shutdown)
    }
}

impl<C, S, H> Orchestrator<C, S, H>
where
    C: ReadinessCheck,
    S: SetupStep,
    H: Handoff,
{
    pub fn new(
        target: DependencyTarget,
        prober: Prober<C>,
        steps: Vec<S>,
        launch: ServerLaunch,
        handoff: H,
    ) -> Self {
        Self {
            target,
            prober,
            steps,
            runtime_dirs: Vec::new(),
            launch,
            handoff,
            shutdown: Shutdown::new(),
            state: RunState::Starting,
        }
    }

    /// Directories created before the first setup step.
    pub fn with_runtime_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.runtime_dirs = dirs;
        self
    }

    /// Termination channel observed while waiting and during setup.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn target(&self) -> &DependencyTarget {
        &self.target
    }

    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    pub fn launch(&self) -> &ServerLaunch {
        &self.launch
    }

    /// Execute the run.
    ///
    /// With an exec handoff this only returns on failure. With a supervised
    /// handoff it returns the server's exit status once the server exits.
    pub async fn run(&mut self) -> Result<i32, EntrypointError> {
        let mut signals = self.shutdown.subscribe();

        self.enter(RunState::WaitingForDependency);
        let readiness = self.prober.wait_until_ready(&self.target, &mut signals).await;
        match readiness {
            Ok(Readiness::Ready { .. }) => {}
            Ok(Readiness::TimedOut { attempts }) => {
                let address = self.target.address();
                return Err(self.fail(EntrypointError::DependencyTimedOut { address, attempts }));
            }
            Err(e) => return Err(self.fail(e.into())),
        }

        self.enter(RunState::RunningSetup);
        let setup_run = async {
            setup::prepare_runtime_dirs(&self.runtime_dirs).await?;
            setup::run_setup(&self.steps).await
        };
        let outcome = tokio::select! {
            result = setup_run => result.map_err(EntrypointError::from),
            Some(signal) = signals.recv() => Err(EntrypointError::Interrupted(signal)),
        };
        if let Err(e) = outcome {
            return Err(self.fail(e));
        }

        self.enter(RunState::HandingOff);
        let handed_off = self.handoff.hand_off(&self.launch).await;
        handed_off.map_err(|e| self.fail(e.into()))
    }

    fn enter(&mut self, state: RunState) {
        tracing::info!(from = %self.state, to = %state, "Startup stage");
        self.state = state;
    }

    fn fail(&mut self, error: EntrypointError) -> EntrypointError {
        tracing::error!(
            stage = %self.state,
            exit_code = error.exit_code(),
            error = %error,
            "Startup aborted"
        );
        self.state = RunState::Failed;
        error
    }
}
