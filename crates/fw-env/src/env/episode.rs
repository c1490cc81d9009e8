//! Episode bookkeeping

use super::reward::StepOutcome;

/// Where an episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// Steps may still be taken
    Running,
    /// The success marker was observed
    Succeeded,
    /// The step limit was reached first
    TimedOut,
}

/// Step counter, step limit and terminal flag of the current episode
#[derive(Debug, Clone)]
pub struct EpisodeState {
    step: u32,
    max_steps: u32,
    status: EpisodeStatus,
}

impl EpisodeState {
    pub fn new(max_steps: u32) -> Self {
        Self {
            step: 0,
            max_steps,
            status: EpisodeStatus::Running,
        }
    }

    /// Steps taken in this episode
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// Termination is sticky until the next reset
    pub fn is_done(&self) -> bool {
        self.status != EpisodeStatus::Running
    }

    /// Start a new episode
    pub fn reset(&mut self) {
        self.step = 0;
        self.status = EpisodeStatus::Running;
    }

    /// Count one more step and return its 1-based index
    pub(crate) fn advance(&mut self) -> u32 {
        self.step = self.step.saturating_add(1);
        self.step
    }

    pub(crate) fn record(&mut self, outcome: StepOutcome) {
        self.status = match outcome {
            StepOutcome::Success => EpisodeStatus::Succeeded,
            StepOutcome::LimitReached => EpisodeStatus::TimedOut,
            StepOutcome::Continue => EpisodeStatus::Running,
        };
    }
}
