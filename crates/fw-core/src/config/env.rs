//! Episode controller configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_secs_f64, option_duration_secs_f64};

/// Configuration for the browser environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Polling schedule used by `reset` while waiting for the first snapshot
    pub reset_backoff: BackoffConfig,

    /// Delay after every action before the snapshot is taken
    #[serde(with = "duration_secs_f64")]
    pub settle_delay: Duration,

    /// Wait used by a `wait` action that does not name a duration
    #[serde(with = "duration_secs_f64")]
    pub default_wait: Duration,

    /// Accept a text snapshot as the initial observation.
    ///
    /// By default `reset` keeps polling until the snapshot is a non-empty
    /// mapping.
    pub accept_text_observation: bool,

    /// Surface transport failures as errors instead of treating the call
    /// as having had no effect
    pub strict: bool,

    /// Reward schedule
    pub rewards: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            reset_backoff: BackoffConfig::default(),
            settle_delay: Duration::from_millis(300),
            default_wait: Duration::from_millis(500),
            accept_text_observation: false,
            strict: false,
            rewards: RewardConfig::default(),
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_secs_f64")]
    pub initial: Duration,

    /// Maximum single delay
    #[serde(with = "duration_secs_f64")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,

    /// Maximum total wait across all retries.
    ///
    /// When absent, `max` doubles as the total budget.
    #[serde(
        default,
        with = "option_duration_secs_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget: Option<Duration>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.0,
            budget: Some(Duration::from_secs(60)),
        }
    }
}

/// Rewards assigned by the step reward law
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward when the success marker is observed
    pub success: f64,
    /// Reward when the step limit is reached without success
    pub timeout: f64,
    /// Reward for every other step
    pub step_cost: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            success: 1.0,
            timeout: -1.0,
            step_cost: -0.01,
        }
    }
}
