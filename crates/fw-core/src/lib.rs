//! fw-core: Core abstractions and configuration for Formwright
//!
//! This crate provides the shared domain types, the transport trait, and
//! the configuration structures used by the environment and the CLI.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ConfigError, ConnectionError};
pub use traits::{Environment, ToolTransport};
pub use types::{Action, ActionKind, Observation, StepInfo, Transition};
