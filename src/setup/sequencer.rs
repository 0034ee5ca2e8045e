//! Runs setup steps strictly in order.

use std::time::Instant;

use crate::setup::step::SetupStep;
use crate::setup::SetupError;

/// Run every step in order, stopping at the first failure.
///
/// Nothing is rolled back: each step is expected to be safe to re-run from
/// scratch when the container restarts.
pub async fn run_setup<S: SetupStep>(steps: &[S]) -> Result<(), SetupError> {
    let total = steps.len();

    for (index, step) in steps.iter().enumerate() {
        let position = index + 1;
        tracing::info!(step = step.name(), position, total, "Running setup step");

        let started = Instant::now();
        match step.run().await {
            Ok(()) => {
                tracing::info!(
                    step = step.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Setup step completed"
                );
            }
            Err(failure) => {
                tracing::error!(
                    step = step.name(),
                    position,
                    total,
                    exit_code = failure.exit_code(),
                    error = %failure,
                    "Setup step failed, skipping remaining steps"
                );
                return Err(SetupError {
                    step: step.name().to_string(),
                    failure,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::setup::StepFailure;

    struct Recorded {
        name: &'static str,
        exit: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SetupStep for Recorded {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self) -> Result<(), StepFailure> {
            self.log.lock().unwrap().push(self.name);
            match self.exit {
                0 => Ok(()),
                code => Err(StepFailure::Exit(code)),
            }
        }
    }

    fn steps(exits: &[(&'static str, i32)], log: &Arc<Mutex<Vec<&'static str>>>) -> Vec<Recorded> {
        exits
            .iter()
            .map(|&(name, exit)| Recorded {
                name,
                exit,
                log: log.clone(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = steps(&[("first", 0), ("second", 0), ("third", 0)], &log);

        run_setup(&steps).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = steps(&[("first", 0), ("second", 5), ("third", 0)], &log);

        let err = run_setup(&steps).await.unwrap_err();

        assert_eq!(err.step, "second");
        assert_eq!(err.exit_code(), 5);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_empty_plan_succeeds() {
        let steps: Vec<Recorded> = Vec::new();
        assert!(run_setup(&steps).await.is_ok());
    }
}
