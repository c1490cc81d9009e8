//! Episodic environment trait

use async_trait::async_trait;

use crate::types::{Action, Observation, Transition};

/// An episodic environment driven one action at a time
#[async_trait]
pub trait Environment: Send {
    /// Error raised when an operation cannot complete
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start a new episode and return the initial observation
    async fn reset(&mut self) -> Result<Observation, Self::Error>;

    /// Apply `action` and report its outcome
    async fn step(&mut self, action: &Action) -> Result<Transition, Self::Error>;

    /// Fetch the current observation without acting
    async fn render(&mut self) -> Result<Observation, Self::Error>;

    /// Release held resources
    async fn close(&mut self) -> Result<(), Self::Error>;
}
