//! Episode controller for browser form-filling tasks

mod browser;
mod episode;
mod reward;

pub use browser::BrowserEnv;
pub use episode::{EpisodeState, EpisodeStatus};
pub use reward::StepOutcome;

use fw_core::error::ConnectionError;
use thiserror::Error;

/// Errors surfaced by the environment
#[derive(Error, Debug)]
pub enum EnvError {
    /// The transport failed and the environment runs in strict mode
    #[error("Remote call failed: {0}")]
    Remote(#[from] ConnectionError),

    /// The cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// `step` was called on a finished episode
    #[error("Episode is done; call reset() to start a new one")]
    EpisodeDone,
}
