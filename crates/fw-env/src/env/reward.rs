//! Step reward law

use fw_core::config::RewardConfig;

/// Classification of a completed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The success marker was found; the episode ends
    Success,
    /// No success and the step limit was reached; the episode ends
    LimitReached,
    /// Neither; the episode continues
    Continue,
}

impl StepOutcome {
    /// Classify a step. Success takes precedence over the step limit.
    pub fn classify(success: bool, step: u32, max_steps: u32) -> Self {
        if success {
            Self::Success
        } else if step >= max_steps {
            Self::LimitReached
        } else {
            Self::Continue
        }
    }

    pub fn reward(&self, rewards: &RewardConfig) -> f64 {
        match self {
            Self::Success => rewards.success,
            Self::LimitReached => rewards.timeout,
            Self::Continue => rewards.step_cost,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
