//! Exponential backoff for snapshot polling

use std::time::Duration;

use fw_core::config::BackoffConfig;

/// Exponential backoff with jitter and an optional total budget
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay handed out first
    initial: Duration,
    /// Current delay
    current: Duration,
    /// Maximum delay
    max: Duration,
    /// Multiplier
    multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
    /// Maximum total delay
    budget: Option<Duration>,
    /// Sum of delays handed out so far
    elapsed: Duration,
}

impl ExponentialBackoff {
    /// Create a new backoff from configuration
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.initial, config.max, config.multiplier, config.jitter)
            .with_budget(config.budget)
    }

    /// Create a new backoff with custom parameters and no budget
    pub fn new(initial: Duration, max: Duration, multiplier: f64, jitter: f64) -> Self {
        Self {
            initial,
            current: initial,
            max,
            multiplier,
            jitter,
            budget: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Bound the total delay
    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    /// Get the next delay and advance the backoff.
    ///
    /// Returns `None` once the budget is spent or the schedule has decayed
    /// to zero. The last delay is shortened so the total lands exactly on
    /// the budget.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.current;

        // Calculate next delay with multiplier
        let next = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max);
        self.current = std::cmp::min(next, self.max);

        // Add jitter
        let jitter_amount = delay.as_secs_f64() * self.jitter * rand::random::<f64>();
        let mut delay =
            delay + Duration::try_from_secs_f64(jitter_amount).unwrap_or(Duration::ZERO);

        if let Some(budget) = self.budget {
            delay = std::cmp::min(delay, budget.saturating_sub(self.elapsed));
        }
        if delay.is_zero() {
            return None;
        }

        self.elapsed += delay;
        Some(delay)
    }

    /// Total delay handed out since creation or the last reset
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reset the backoff to its initial delay
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.elapsed = Duration::ZERO;
    }
}

impl Iterator for ExponentialBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.next_delay()
    }
}
