//! fw-env: Browser environment for form-filling agents
//!
//! The environment drives a browser through a Model Context Protocol tool
//! server. [`McpClient`] speaks to the server; [`BrowserEnv`] runs episodes
//! against any [`ToolTransport`](fw_core::ToolTransport) and computes
//! rewards.

pub mod backoff;
pub mod client;
pub mod env;
pub mod refs;
pub mod scripted;
pub mod tools;

pub use backoff::ExponentialBackoff;
pub use client::McpClient;
pub use env::{BrowserEnv, EnvError, EpisodeState, EpisodeStatus, StepOutcome};
pub use refs::{extract_refs, find_form_refs, FormRefs};
pub use scripted::ScriptedFormFiller;
