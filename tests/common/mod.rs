//! Shared fakes for orchestrator and binary tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use container_entrypoint::config::DependencyTarget;
use container_entrypoint::handoff::{Handoff, HandoffError, ServerLaunch};
use container_entrypoint::probe::{CheckOutcome, ProbeError, ReadinessCheck};
use container_entrypoint::setup::{SetupStep, StepFailure};

pub fn target() -> DependencyTarget {
    DependencyTarget {
        host: "db".into(),
        port: 5432,
        user: "library".into(),
    }
}

/// Refuses the first `failures` checks, accepts afterwards.
#[derive(Clone)]
pub struct ScriptedCheck {
    failures: u32,
    calls: Arc<AtomicU32>,
}

impl ScriptedCheck {
    pub fn ready_after(failures: u32) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn never_ready() -> Self {
        Self::ready_after(u32::MAX)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadinessCheck for ScriptedCheck {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn check(&self, _target: &DependencyTarget) -> Result<CheckOutcome, ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Ok(CheckOutcome::NotReady("connection refused".into()))
        } else {
            Ok(CheckOutcome::Ready)
        }
    }
}

/// What a recording step does when run.
#[derive(Clone, Copy)]
pub enum Behavior {
    Succeed,
    Exit(i32),
    Hang,
}

/// Appends its name to a shared journal, then behaves as configured.
pub struct RecordingStep {
    name: &'static str,
    behavior: Behavior,
    journal: Arc<Mutex<Vec<String>>>,
}

impl RecordingStep {
    pub fn new(name: &'static str, behavior: Behavior, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            behavior,
            journal: journal.clone(),
        }
    }
}

impl SetupStep for RecordingStep {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self) -> Result<(), StepFailure> {
        self.journal.lock().unwrap().push(self.name.to_string());
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Exit(code) => Err(StepFailure::Exit(code)),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

/// Records every launch it is asked to perform and reports a clean exit.
#[derive(Clone, Default)]
pub struct RecordingHandoff {
    launches: Arc<Mutex<Vec<ServerLaunch>>>,
}

impl RecordingHandoff {
    pub fn launches(&self) -> Vec<ServerLaunch> {
        self.launches.lock().unwrap().clone()
    }
}

impl Handoff for RecordingHandoff {
    async fn hand_off(&self, launch: &ServerLaunch) -> Result<i32, HandoffError> {
        self.launches.lock().unwrap().push(launch.clone());
        Ok(0)
    }
}
