//! Polling loop that gates startup on database readiness.

use tokio::time;

use crate::config::{DependencyTarget, ProbeConfig};
use crate::lifecycle::SignalReceiver;
use crate::probe::check::{CheckOutcome, ReadinessCheck};
use crate::probe::ProbeError;
use crate::resilience::PollDelay;

/// How the wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The last of `attempts` checks succeeded.
    Ready { attempts: u32 },
    /// The attempt limit was reached without a successful check.
    TimedOut { attempts: u32 },
}

/// Repeats a readiness check until it succeeds.
#[derive(Debug, Clone)]
pub struct Prober<C> {
    check: C,
    delay: PollDelay,
    max_attempts: Option<u32>,
}

impl<C: ReadinessCheck> Prober<C> {
    /// Wait forever, sleeping `delay` between failed attempts.
    pub fn new(check: C, delay: PollDelay) -> Self {
        Self {
            check,
            delay,
            max_attempts: None,
        }
    }

    pub fn from_config(check: C, config: &ProbeConfig) -> Self {
        Self::new(check, PollDelay::from_config(config)).with_max_attempts(config.max_attempts)
    }

    /// Stop after `max_attempts` failed checks. `None` waits forever.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn check(&self) -> &C {
        &self.check
    }

    /// Poll `target` until it is ready, the attempt limit is hit, or a
    /// termination signal arrives.
    pub async fn wait_until_ready(
        &self,
        target: &DependencyTarget,
        shutdown: &mut SignalReceiver,
    ) -> Result<Readiness, ProbeError> {
        tracing::info!(
            host = %target.host,
            port = target.port,
            user = %target.user,
            check = self.check.name(),
            interval_ms = self.delay.interval().as_millis() as u64,
            max_attempts = ?self.max_attempts,
            "Waiting for database"
        );

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;

            let outcome = tokio::select! {
                outcome = self.check.check(target) => outcome?,
                Some(signal) = shutdown.recv() => return Err(ProbeError::Interrupted(signal)),
            };

            let reason = match outcome {
                CheckOutcome::Ready => {
                    tracing::info!(attempts, address = %target.address(), "Database is ready");
                    return Ok(Readiness::Ready { attempts });
                }
                CheckOutcome::NotReady(reason) => reason,
            };

            if self.max_attempts.is_some_and(|max| attempts >= max) {
                tracing::warn!(attempts, reason = %reason, "Giving up on database");
                return Ok(Readiness::TimedOut { attempts });
            }

            let wait = self.delay.after_failure(attempts);
            tracing::info!(
                attempt = attempts,
                reason = %reason,
                retry_in_ms = wait.as_millis() as u64,
                "Database not ready yet, waiting"
            );

            tokio::select! {
                _ = time::sleep(wait) => {}
                Some(signal) = shutdown.recv() => return Err(ProbeError::Interrupted(signal)),
            }
        }
    }
}
