//! Poll delays: a fixed interval, or exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::{PollSchedule, ProbeConfig};

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Delay to sleep after each failed readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollDelay {
    schedule: PollSchedule,
    interval: Duration,
    max_interval: Duration,
}

impl PollDelay {
    /// Constant delay between attempts.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            schedule: PollSchedule::Fixed,
            interval,
            max_interval: interval,
        }
    }

    /// Exponential delay starting at `interval`, capped at `max_interval`.
    pub fn exponential(interval: Duration, max_interval: Duration) -> Self {
        Self {
            schedule: PollSchedule::Exponential,
            interval,
            max_interval,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        let interval = Duration::from_secs(config.interval_secs);
        match config.schedule {
            PollSchedule::Fixed => Self::fixed(interval),
            PollSchedule::Exponential => {
                Self::exponential(interval, Duration::from_secs(config.max_interval_secs))
            }
        }
    }

    /// Base interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay after the `failures`-th consecutive failed attempt (1-based).
    pub fn after_failure(&self, failures: u32) -> Duration {
        match self.schedule {
            PollSchedule::Fixed => self.interval,
            PollSchedule::Exponential => calculate_backoff(
                failures.max(1),
                self.interval.as_millis() as u64,
                self.max_interval.as_millis() as u64,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000);
        assert!(max.as_millis() < 1100);
    }

    #[test]
    fn test_fixed_delay_is_exact() {
        let delay = PollDelay::fixed(Duration::from_secs(2));
        for failures in [1, 2, 10, 1000] {
            assert_eq!(delay.after_failure(failures), Duration::from_secs(2));
        }
    }

    #[test]
    fn test_exponential_delay_grows_and_caps() {
        let delay = PollDelay::exponential(Duration::from_secs(2), Duration::from_secs(30));
        assert!(delay.after_failure(1) >= Duration::from_secs(2));
        assert!(delay.after_failure(3) >= Duration::from_secs(8));
        let capped = delay.after_failure(20);
        assert!(capped >= Duration::from_secs(30));
        assert!(capped < Duration::from_secs(33));
    }

    #[test]
    fn test_from_config_defaults_to_fixed() {
        let delay = PollDelay::from_config(&ProbeConfig::default());
        assert_eq!(delay, PollDelay::fixed(Duration::from_secs(2)));
    }
}
